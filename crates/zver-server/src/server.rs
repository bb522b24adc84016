use std::sync::Arc;

use tokio::net::TcpListener;

use zver_blob::BlobStore;
use zver_store::ReleaseStore;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// The release coordination server.
pub struct ReleaseServer {
    state: AppState,
}

impl ReleaseServer {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn ReleaseStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            state: AppState::new(store, blobs, config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let bind_addr = self.state.config.bind_addr;
        let app = self.router();
        let listener = TcpListener::bind(bind_addr).await?;
        tracing::info!("zver listening on {bind_addr}");
        axum::serve(listener, app)
            .await
            .map_err(|err| ServerError::Internal(err.to_string()))
    }
}
