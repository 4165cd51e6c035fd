use std::future::Future;

use crate::{Item, ItemId, NewItem};

/// Async CRUD accessor for the remote item collection.
///
/// The remote is authoritative: it assigns identifiers on `create` and its
/// `fetch_all` snapshot is what the local store mirrors after a sync.
/// Implementations report network failures as errors and never retry.
pub trait RemoteClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the full collection.
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send;

    /// Creates an item; the returned item carries the remote identifier.
    fn create(&self, item: &NewItem) -> impl Future<Output = Result<Item, Self::Error>> + Send;

    /// Overwrites the remote item with the same id.
    fn update(&self, item: &Item) -> impl Future<Output = Result<Item, Self::Error>> + Send;

    /// Probes whether the remote knows `id`.
    ///
    /// Absence is `Ok(false)`, not an error.
    fn exists(&self, id: ItemId) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn delete(&self, id: ItemId) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
