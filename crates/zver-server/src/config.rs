use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Service configuration.
///
/// The API token and public URL base may be absent; the routes that need
/// them answer 500 at request time instead of refusing to start, so a
/// partially configured instance still serves what it can.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Token for `Basic admin:<token>` on the publish route.
    pub api_token: Option<String>,
    /// Base URL of the CDN-fronted blob store, without a trailing slash.
    pub public_url_base: Option<String>,
    /// Reject publishes missing minisign signatures.
    pub force_minisign: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().expect("valid literal addr"),
            api_token: None,
            public_url_base: None,
            force_minisign: false,
        }
    }
}

impl ServerConfig {
    /// Read `ZVER_API_TOKEN`, `ZVER_PUBLIC_URL_BASE` and
    /// `ZVER_FORCE_MINISIGN` from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(token) = std::env::var("ZVER_API_TOKEN") {
            if !token.is_empty() {
                config.api_token = Some(token);
            }
        }
        if let Ok(base) = std::env::var("ZVER_PUBLIC_URL_BASE") {
            if !base.is_empty() {
                config.public_url_base = Some(base);
            }
        }
        if let Ok(force) = std::env::var("ZVER_FORCE_MINISIGN") {
            config.force_minisign = matches!(force.as_str(), "1" | "true" | "yes");
        }
        config
    }

    /// The public URL base with any trailing slashes removed.
    pub fn public_url_base(&self) -> Option<&str> {
        self.public_url_base
            .as_deref()
            .map(|base| base.trim_end_matches('/'))
    }
}
