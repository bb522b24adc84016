use std::sync::Arc;

use zver_blob::BlobStore;
use zver_store::ReleaseStore;

use crate::config::ServerConfig;

/// Shared handler state. The store and blob store are the only mutable
/// shared state in the service; handlers own nothing else.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReleaseStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ReleaseStore>,
        blobs: Arc<dyn BlobStore>,
        config: ServerConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            config: Arc::new(config),
        }
    }
}
