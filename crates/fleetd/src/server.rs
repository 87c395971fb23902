//! HTTP server for fleetd

use crate::cache::SnapshotCache;
use crate::config::Config;
use crate::routes;
use anyhow::Result;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub cache: SnapshotCache,
}

impl AppState {
    pub fn new(cache: SnapshotCache) -> Self {
        Self { cache }
    }
}

/// Build the full router: API routes plus the static frontend bundle.
pub fn router(state: Arc<AppState>, frontend_dir: &Path) -> Router {
    Router::new()
        .merge(routes::tracking_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .route_service("/", ServeFile::new(frontend_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(frontend_dir))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until ctrl-c.
pub async fn run(config: &Config, state: Arc<AppState>) -> Result<()> {
    let app = router(state, &config.frontend_dir);

    // Bind to localhost only; this is a local re-serving proxy.
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("  Listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
