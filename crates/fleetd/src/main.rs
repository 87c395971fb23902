//! Fleet Daemon - tracking cache daemon
//!
//! Polls the upstream tracking API on a fixed interval and re-serves the
//! latest snapshot to local clients.

use anyhow::Result;
use fleetd::cache::SnapshotCache;
use fleetd::config::Config;
use fleetd::refresher::Refresher;
use fleetd::server::{self, AppState};
use fleetd::upstream::NavixyClient;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Fleet Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    info!(
        "Upstream {} (key {}), refresh every {}s",
        config.api_url,
        config.redacted_key(),
        config.refresh_interval.as_secs()
    );

    let cache = SnapshotCache::new();
    let client = Arc::new(NavixyClient::new(&config)?);

    // The composition root owns the refresher's lifecycle: started here,
    // signaled and joined on shutdown.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher =
        Refresher::new(client, cache.clone(), config.refresh_interval).spawn(shutdown_rx);

    let state = Arc::new(AppState::new(cache));
    server::run(&config, state).await?;

    let _ = shutdown_tx.send(true);
    refresher.await?;

    info!("Shutting down gracefully");
    Ok(())
}
