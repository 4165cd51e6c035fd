use stockroom_core::{Connectivity, ReconcileReport, Reconciler};
use stockroom_http::{HttpError, HttpRemote};
use stockroom_rocks::RocksStore;
use tracing::info;

use crate::config::Settings;
use crate::error::ToolError;

pub type AppReconciler = Reconciler<RocksStore, HttpRemote>;

pub struct AppContext {
    pub reconciler: AppReconciler,
    pub base_url: String,
}

impl AppContext {
    /// Opens the local store and builds a reconciler in the offline state.
    pub fn open(settings: &Settings) -> Result<Self, ToolError> {
        std::fs::create_dir_all(&settings.store_path)?;
        let store = RocksStore::open(&settings.store_path)?;
        let remote = HttpRemote::with_timeout(&settings.base_url, settings.timeout)?;

        Ok(Self {
            reconciler: Reconciler::new(store, remote),
            base_url: settings.base_url.clone(),
        })
    }

    /// Probes the remote and, if it answers, delivers the online transition.
    ///
    /// Returns the reconciliation report, or None when the remote is unreachable.
    pub async fn connect(&mut self) -> Result<Option<ReconcileReport<HttpError>>, ToolError> {
        if !self.reconciler.remote().ping().await {
            info!(url = %self.base_url, "remote unreachable, working offline");
            return Ok(None);
        }

        Ok(self.reconciler.handle(Connectivity::Online).await?)
    }
}
