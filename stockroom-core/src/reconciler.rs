use std::fmt;

use tracing::{debug, info, instrument};

use crate::sync::{self, ReconcileReport, ReplayReport, SyncError};
use crate::{Item, ItemId, LocalStore, NewItem, RemoteClient};

/// Connectivity as seen by the reconciler. Doubles as the transition event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    #[default]
    Offline,
    Online,
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Offline => write!(f, "offline"),
            Connectivity::Online => write!(f, "online"),
        }
    }
}

type Result<T, L, R> = std::result::Result<T, SyncError<<L as LocalStore>::Error, <R as RemoteClient>::Error>>;

/// Drives a local store and a remote collection through connectivity changes.
///
/// Offline, writes land in the local store marked pending. Entering the
/// online state replays the pending items and then mirrors the remote
/// snapshot. Online, writes go straight to the remote and are followed by a
/// snapshot pull.
///
/// Methods that start a reconciliation take `&mut self`, so at most one is in
/// flight per reconciler.
pub struct Reconciler<L, R> {
    local: L,
    remote: R,
    state: Connectivity,
}

impl<L, R> Reconciler<L, R>
where
    L: LocalStore,
    R: RemoteClient,
{
    /// Creates a reconciler in the offline state.
    pub fn new(local: L, remote: R) -> Self {
        Self::with_state(local, remote, Connectivity::Offline)
    }

    /// Creates a reconciler in the given state without reconciling.
    pub fn with_state(local: L, remote: R, state: Connectivity) -> Self {
        Self {
            local,
            remote,
            state,
        }
    }

    pub fn state(&self) -> Connectivity {
        self.state
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Consumes a connectivity event.
    ///
    /// Only an offline-to-online transition reconciles; its report is
    /// returned. The state is updated before the pass runs, so a failed pass
    /// leaves the reconciler online.
    #[instrument(skip(self), fields(from = %self.state))]
    pub async fn handle(
        &mut self,
        event: Connectivity,
    ) -> Result<Option<ReconcileReport<R::Error>>, L, R> {
        let previous = std::mem::replace(&mut self.state, event);
        if previous == event {
            debug!("connectivity unchanged");
            return Ok(None);
        }

        info!(to = %event, "connectivity changed");
        match event {
            Connectivity::Online => self.reconcile().await.map(Some),
            Connectivity::Offline => Ok(None),
        }
    }

    /// Replays pending items, then mirrors the remote snapshot.
    pub async fn reconcile(&mut self) -> Result<ReconcileReport<R::Error>, L, R> {
        sync::reconcile(&self.local, &self.remote).await
    }

    /// Pushes pending items to the remote without pulling afterwards.
    pub async fn replay_pending(&mut self) -> Result<ReplayReport<R::Error>, L, R> {
        sync::replay_pending(&self.local, &self.remote).await
    }

    /// Mirrors the remote snapshot into the local store.
    pub async fn pull_snapshot(&mut self) -> Result<usize, L, R> {
        sync::pull_snapshot(&self.local, &self.remote).await
    }

    /// Current local view of the inventory.
    pub fn items(&self) -> Result<Vec<Item>, L, R> {
        self.local.list().map_err(SyncError::Storage)
    }

    /// Creates an item.
    ///
    /// Online, the remote creates it and the local store is re-pulled; a
    /// remote failure is returned and nothing is written locally. Offline,
    /// the item is stored locally as pending under a temporary id.
    pub async fn create(&mut self, item: NewItem) -> Result<Item, L, R> {
        match self.state {
            Connectivity::Online => {
                let created = self
                    .remote
                    .create(&item)
                    .await
                    .map_err(SyncError::Remote)?;
                self.pull_snapshot().await?;
                Ok(created.with_pending(false))
            }
            Connectivity::Offline => self
                .local
                .insert(&item, true)
                .map_err(SyncError::Storage),
        }
    }

    /// Updates an item, with the same online/offline split as [`create`].
    ///
    /// [`create`]: Reconciler::create
    pub async fn update(&mut self, item: Item) -> Result<Item, L, R> {
        match self.state {
            Connectivity::Online => {
                let updated = self
                    .remote
                    .update(&item)
                    .await
                    .map_err(SyncError::Remote)?;
                self.pull_snapshot().await?;
                Ok(updated.with_pending(false))
            }
            Connectivity::Offline => {
                let item = item.with_pending(true);
                self.local.upsert(&item).map_err(SyncError::Storage)?;
                Ok(item)
            }
        }
    }

    /// Deletes an item.
    ///
    /// Offline deletes only touch the local store and are not replayed: if
    /// the remote still has the item, the next snapshot pull restores it.
    pub async fn delete(&mut self, id: ItemId) -> Result<(), L, R> {
        match self.state {
            Connectivity::Online => {
                self.remote.delete(id).await.map_err(SyncError::Remote)?;
                self.pull_snapshot().await?;
                Ok(())
            }
            Connectivity::Offline => self.local.remove(id).map_err(SyncError::Storage),
        }
    }
}
