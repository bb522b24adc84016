use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::cors;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all routes. Method mismatches on known
/// paths answer 405; unknown paths 404; every response passes through
/// the CORS layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route(
            "/v1/zls/select-version",
            get(handler::select_version_handler).options(cors::preflight),
        )
        .route(
            "/v1/zls/index.json",
            get(handler::index_redirect_handler).options(cors::preflight),
        )
        .route(
            "/v1/zls/publish",
            post(handler::publish_handler).options(cors::preflight),
        )
        .fallback(handler::not_found_handler)
        .layer(middleware::from_fn(cors::cors_layer))
        .with_state(state)
}
