use stockroom_core::{ItemId, SyncError};
use stockroom_http::HttpError;
use stockroom_rocks::RocksError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] RocksError),

    #[error("Remote error: {0}")]
    Remote(#[from] HttpError),

    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError<RocksError, HttpError>),

    #[error("Remote unreachable at {0}")]
    Unreachable(String),

    #[error("`{0}` needs the remote, run it without --offline")]
    NeedsRemote(&'static str),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
}
