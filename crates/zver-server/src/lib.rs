//! HTTP surface of the ZLS release coordination service.
//!
//! Three public routes: `select-version` (the read path), the
//! `index.json` redirect, and `publish` (the authenticated write path).
//! Every response carries permissive CORS headers; typed selection
//! failures are 200s with a `{code, message}` body, per the wire
//! contract.

pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{check_authorization, AuthError};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::ReleaseServer;
pub use state::AppState;
