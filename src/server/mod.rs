//! HTTP surface for the chat pipeline.
//!
//! Exposes `POST /api/chat` and `GET /healthz`, and serves the chat widget
//! assets for every other path.

mod handlers;

pub use handlers::{ChatRequest, ChatResponse, ErrorResponse, ExecutionErrorResponse};

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chat::ChatService;

/// Header carrying the caller's session id in per-client mode.
pub const SESSION_HEADER: &str = "x-session-id";

/// State shared by every handler.
pub type AppState = Arc<ChatService>;

/// Builds the application router.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/healthz", get(|| async { "OK" }))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `router` on `addr` until Ctrl-C is received.
pub async fn serve(router: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for Ctrl-C, shutting down");
        return;
    }
    info!("Shutdown signal received");
}
