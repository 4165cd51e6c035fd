//! Sync passes between a local store and the remote collection.
//!
//! A full reconciliation is two passes run back to back:
//!
//! 1. [`replay_pending`] pushes every pending local item to the remote, one at
//!    a time. Remote failures are contained per item; the item stays pending.
//! 2. [`pull_snapshot`] fetches the remote collection and mirrors it into the
//!    local store, dropping whatever replay did not manage to push.

use std::collections::VecDeque;

use tracing::{debug, info, instrument, warn};

use crate::{Item, ItemId, LocalStore, RemoteClient};

/// Error during sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError<L, R> {
    /// The local store could not complete an operation. Never retried.
    #[error("local store error: {0}")]
    Storage(L),
    /// The remote was unreachable or rejected a request.
    #[error("remote error: {0}")]
    Remote(R),
}

impl<L, R> SyncError<L, R> {
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Remote(_))
    }
}

/// What replay did with a pending item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replayed {
    /// The remote already had the id; its fields were overwritten.
    Updated { id: ItemId },
    /// The remote did not know the id; the item was created there and the
    /// temporary local record was swapped for the remote one.
    Recreated { temp_id: ItemId, id: ItemId },
}

/// A pending item that could not be replayed. It is still pending locally.
#[derive(Debug)]
pub struct ReplayFailure<E> {
    pub id: ItemId,
    pub error: E,
}

/// Per-item outcome of a replay pass.
#[derive(Debug)]
pub struct ReplayReport<E> {
    pub replayed: Vec<Replayed>,
    pub failed: Vec<ReplayFailure<E>>,
}

impl<E> Default for ReplayReport<E> {
    fn default() -> Self {
        Self {
            replayed: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<E> ReplayReport<E> {
    /// True when every pending item reached the remote.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of a full reconciliation.
#[derive(Debug)]
pub struct ReconcileReport<E> {
    pub replay: ReplayReport<E>,
    /// Number of items mirrored from the remote snapshot.
    pub pulled: usize,
}

/// Pushes every pending local item to the remote, sequentially, in the local
/// store's iteration order.
///
/// Each item is re-read before it is replayed, so records rewritten by an
/// earlier step of the same pass are replayed as they are now. Remote errors
/// are recorded in the report and the pass moves on to the next item. Storage
/// errors abort the pass.
#[instrument(skip_all)]
pub async fn replay_pending<L, R>(
    local: &L,
    remote: &R,
) -> Result<ReplayReport<R::Error>, SyncError<L::Error, R::Error>>
where
    L: LocalStore,
    R: RemoteClient,
{
    let mut queue: VecDeque<ItemId> = local
        .list()
        .map_err(SyncError::Storage)?
        .into_iter()
        .filter(|item| item.pending)
        .map(|item| item.id)
        .collect();

    debug!(count = queue.len(), "replaying pending items");

    let mut report = ReplayReport::default();
    while let Some(id) = queue.pop_front() {
        let Some(item) = local
            .get(id)
            .map_err(SyncError::Storage)?
            .filter(|item| item.pending)
        else {
            debug!(id, "item no longer pending, skipped");
            continue;
        };

        match replay_step(local, remote, &item).await {
            Ok(step) => {
                if let Some(moved) = step.moved {
                    follow_move(&mut queue, &mut report, moved);
                }
                report.replayed.push(step.outcome);
            }
            Err(SyncError::Remote(error)) => {
                warn!(id = item.id, %error, "replay failed, item stays pending");
                report.failed.push(ReplayFailure { id: item.id, error });
            }
            Err(err @ SyncError::Storage(_)) => return Err(err),
        }
    }

    Ok(report)
}

/// Replays a single pending item.
///
/// The existence probe picks the path: a known id is an update, an unknown id
/// is recreated under a remote-assigned identifier. A different pending
/// record already stored under that identifier is moved to a fresh temporary
/// id first, and stays pending.
pub async fn replay_item<L, R>(
    local: &L,
    remote: &R,
    item: &Item,
) -> Result<Replayed, SyncError<L::Error, R::Error>>
where
    L: LocalStore,
    R: RemoteClient,
{
    replay_step(local, remote, item).await.map(|step| step.outcome)
}

/// A pending record moved out of the way of a recreated item.
#[derive(Debug, Clone, Copy)]
struct Moved {
    from: ItemId,
    to: ItemId,
}

struct Step {
    outcome: Replayed,
    moved: Option<Moved>,
}

async fn replay_step<L, R>(
    local: &L,
    remote: &R,
    item: &Item,
) -> Result<Step, SyncError<L::Error, R::Error>>
where
    L: LocalStore,
    R: RemoteClient,
{
    if remote.exists(item.id).await.map_err(SyncError::Remote)? {
        remote.update(item).await.map_err(SyncError::Remote)?;
        local
            .upsert(&item.clone().with_pending(false))
            .map_err(SyncError::Storage)?;
        debug!(id = item.id, "pending item pushed as update");
        return Ok(Step {
            outcome: Replayed::Updated { id: item.id },
            moved: None,
        });
    }

    let created = remote
        .create(&item.draft())
        .await
        .map_err(SyncError::Remote)?;
    local.remove(item.id).map_err(SyncError::Storage)?;

    let moved = match local.get(created.id).map_err(SyncError::Storage)? {
        Some(other) if other.pending => {
            let relocated = local
                .insert(&other.draft(), true)
                .map_err(SyncError::Storage)?;
            debug!(from = other.id, to = relocated.id, "pending item moved off a remote id");
            Some(Moved {
                from: other.id,
                to: relocated.id,
            })
        }
        _ => None,
    };

    local
        .upsert(&created.clone().with_pending(false))
        .map_err(SyncError::Storage)?;
    debug!(temp_id = item.id, id = created.id, "pending item recreated remotely");

    Ok(Step {
        outcome: Replayed::Recreated {
            temp_id: item.id,
            id: created.id,
        },
        moved,
    })
}

/// Points queued and already-failed entries at a moved record's new id.
fn follow_move<E>(queue: &mut VecDeque<ItemId>, report: &mut ReplayReport<E>, moved: Moved) {
    for id in queue.iter_mut().filter(|id| **id == moved.from) {
        *id = moved.to;
    }
    for failure in report.failed.iter_mut().filter(|f| f.id == moved.from) {
        failure.id = moved.to;
    }
}

/// Mirrors the remote collection into the local store.
///
/// If the fetch fails the local store is left exactly as it was.
/// Returns the number of items mirrored.
#[instrument(skip_all)]
pub async fn pull_snapshot<L, R>(local: &L, remote: &R) -> Result<usize, SyncError<L::Error, R::Error>>
where
    L: LocalStore,
    R: RemoteClient,
{
    let items: Vec<Item> = remote
        .fetch_all()
        .await
        .map_err(SyncError::Remote)?
        .into_iter()
        .map(|item| item.with_pending(false))
        .collect();

    local.replace_all(&items).map_err(SyncError::Storage)?;
    info!(count = items.len(), "local store mirrored from remote");

    Ok(items.len())
}

/// Runs [`replay_pending`] followed by [`pull_snapshot`].
///
/// The pull runs even when replay recorded failures.
pub async fn reconcile<L, R>(
    local: &L,
    remote: &R,
) -> Result<ReconcileReport<R::Error>, SyncError<L::Error, R::Error>>
where
    L: LocalStore,
    R: RemoteClient,
{
    let replay = replay_pending(local, remote).await?;
    let pulled = pull_snapshot(local, remote).await?;
    Ok(ReconcileReport { replay, pulled })
}
