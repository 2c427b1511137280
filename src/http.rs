//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::RelayConfig;
use crate::relay::{handler::ws_handler, AppState};
use crate::SyncResult;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - storefront clients connect from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Sync relay endpoint
        .route("/sync", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Bind the configured address and run the relay until interrupted.
///
/// Binding failure is the only fatal error; everything past this point
/// is contained per-connection.
pub async fn serve(config: &RelayConfig) -> SyncResult<()> {
    let state = Arc::new(AppState::new());
    let addr = config.listen_addr();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "sync relay listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves when the process receives Ctrl+C. The relay keeps no state
/// worth flushing; open connections are simply dropped.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let state = Arc::new(AppState::new());
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_sync_requires_upgrade() {
        let state = Arc::new(AppState::new());
        let app = create_router(state);

        // A plain GET without the upgrade handshake is rejected
        let response = app
            .oneshot(Request::builder().uri("/sync").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
