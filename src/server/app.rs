//! Router assembly and the serve loop.

use super::handlers;
use crate::data::MortalityData;
use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

/// Read-only data shared by every handler.
pub type AppState = Arc<MortalityData>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/options", get(handlers::options))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/charts/{kind}", get(handlers::chart))
        .route("/healthz", get(handlers::healthz))
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(state: AppState, addr: &str, open_browser: bool) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let url = format!("http://{}", listener.local_addr()?);
    log::info!("Serving dashboard at {}", url);

    if open_browser {
        if let Err(e) = open::that(&url) {
            log::warn!("Could not open browser automatically ({}). Visit: {}", e, url);
        }
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
