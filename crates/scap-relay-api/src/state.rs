use std::sync::Arc;

use scap_relay_core::Config;
use scap_relay_services::{Forwarder, ReportIngestor, UpstreamForwarder};
use scap_relay_storage::StorageFS;

/// Shared application state: configuration, storage, and the ingestor.
pub struct AppState {
    pub config: Config,
    pub storage: StorageFS,
    pub ingestor: ReportIngestor,
}

impl AppState {
    /// Wire the real upstream forwarder from configuration.
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let forwarder = Arc::new(UpstreamForwarder::from_config(&config)?);
        Ok(Self::with_forwarder(config, forwarder))
    }

    /// Wire an explicit forwarder. Tests inject scripted forwarders here.
    pub fn with_forwarder(config: Config, forwarder: Arc<dyn Forwarder>) -> Self {
        let storage = StorageFS::from_config(&config);
        let ingestor = ReportIngestor::new(forwarder, storage.clone());
        AppState {
            config,
            storage,
            ingestor,
        }
    }
}
