//! Environment-supplied configuration
//!
//! Both halves of the system read their settings from the environment
//! and fall back to local defaults, so a bare `sync-relay` and a bare
//! connector find each other on one machine with no setup.

use std::env;
use std::time::Duration;

/// Default relay listen port
pub const DEFAULT_PORT: u16 = 8081;

/// Default relay bind address
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default endpoint the connector dials
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8081/sync";

/// Relay server configuration
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub bind: String,
    pub port: u16,
}

impl RelayConfig {
    /// Read `SYNC_RELAY_BIND` / `SYNC_RELAY_PORT`, falling back to defaults
    pub fn from_env() -> Self {
        let port = env::var("SYNC_RELAY_PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let bind = env::var("SYNC_RELAY_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        Self { bind, port }
    }

    /// Socket address string to bind
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Sync connector configuration
#[derive(Clone, Debug)]
pub struct ConnectorConfig {
    /// Relay endpoint URL
    pub endpoint: String,

    /// Delay before the first reconnect attempt
    pub initial_backoff: Duration,

    /// Ceiling for the reconnect delay
    pub max_backoff: Duration,
}

impl ConnectorConfig {
    /// Read `SYNC_RELAY_URL`, falling back to the local default endpoint
    pub fn from_env() -> Self {
        let endpoint =
            env::var("SYNC_RELAY_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::with_endpoint(endpoint)
    }

    /// Configuration pointing at an explicit endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }
}
