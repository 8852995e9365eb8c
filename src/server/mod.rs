//! HTTP API server.

pub mod handlers;

use crate::core::scanner::LibraryScanner;
use crate::services::ContentSource;
use crate::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for request handlers.
pub struct AppState {
    pub scanner: LibraryScanner,
    pub content: Arc<dyn ContentSource>,
}

impl AppState {
    pub fn new(scanner: LibraryScanner, content: Arc<dyn ContentSource>) -> Self {
        Self { scanner, content }
    }
}

/// Create the router with all API routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/scan", get(handlers::scan_library))
        .route("/api/movie/{id}", get(handlers::get_movie))
        .route("/api/tv/{id}", get(handlers::get_show))
        .route("/api/video/{id}", get(handlers::get_video))
        .route("/api/stream/{id}", get(handlers::stream_video))
        .route("/api/subtitle/{id}", get(handlers::get_subtitle))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(state: Arc<AppState>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
