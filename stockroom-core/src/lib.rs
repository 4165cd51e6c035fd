//! Stockroom keeps an inventory usable while offline.
//!
//! Core concepts:
//! - **Item**: an inventory record; `pending` while the remote has not confirmed it
//! - **LocalStore**: durable keyed storage that allocates temporary ids
//! - **RemoteClient**: async CRUD access to the authoritative collection
//! - **Reconciler**: replays pending items and mirrors the remote whenever
//!   connectivity comes back
//!
//! # Example
//!
//! ```ignore
//! use stockroom_core::{Connectivity, MemoryStore, NewItem, Reconciler};
//!
//! let mut reconciler = Reconciler::new(MemoryStore::new(), remote);
//!
//! // Offline writes are kept locally as pending
//! let bolt = reconciler.create(NewItem::new("Bolt", 5)).await?;
//! assert!(bolt.pending);
//!
//! // Coming online replays them and mirrors the remote
//! let report = reconciler.handle(Connectivity::Online).await?;
//! ```

mod item;
mod reconciler;
mod remote;
mod store;
pub mod sync;

pub use item::{Item, ItemId, NewItem};
pub use reconciler::{Connectivity, Reconciler};
pub use remote::RemoteClient;
pub use store::{LocalStore, MemoryStore};
pub use sync::{ReconcileReport, ReplayFailure, ReplayReport, Replayed, SyncError};
