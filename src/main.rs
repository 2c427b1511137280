//! Sync Relay - Binary Entry Point
//!
//! This is the main entry point for the sync-relay binary.

use store_sync::config::RelayConfig;
use store_sync::SyncResult;

#[tokio::main]
async fn main() -> SyncResult<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = RelayConfig::from_env();
    store_sync::http::serve(&config).await
}
