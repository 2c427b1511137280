//! Store Sync Relay
//!
//! A real-time synchronization relay for storefront clients. The relay
//! lets independently-connected sessions agree, without polling, that
//! shared catalog state (products, sliders, settings) changed elsewhere
//! and should be refetched.
//!
//! # Features
//!
//! - **Fan-out broadcast**: every valid frame is forwarded to all other
//!   connected clients, never back to its origin
//! - **Failure isolation**: a malformed frame, slow consumer, or abrupt
//!   disconnect affects only that connection
//! - **Reconnecting client**: the sync connector retries forever with
//!   exponential backoff and dispatches refetch triggers into the
//!   embedding application
//!
//! # Modules
//!
//! - `envelope`: the typed wire envelope and its codec
//! - `relay`: registry, fan-out, and connection lifecycle handling
//! - `http`: Axum router and server entry
//! - `connector`: client-side state machine and refetch dispatch
//! - `config`: environment-supplied settings
//!
//! # Example
//!
//! ```no_run
//! use store_sync::config::RelayConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RelayConfig::from_env();
//!     store_sync::http::serve(&config).await.unwrap();
//! }
//! ```

pub mod config;
pub mod connector;
pub mod envelope;
pub mod http;
pub mod relay;

// Re-export commonly used items at crate root
pub use config::{ConnectorConfig, RelayConfig};
pub use connector::{
    ConnectorState, RefetchTarget, SyncConnector, SyncHandle, UpdateListener,
};
pub use envelope::Envelope;
pub use relay::{AppState, ConnectionId};

/// Result type for fallible relay operations
pub type SyncResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
