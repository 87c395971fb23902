//! Background refresh loop
//!
//! Polls the snapshot source on a fixed interval and replaces the cache
//! on success. A failed cycle leaves the cache untouched; the fixed
//! interval is the retry delay. The loop never dies on its own; it stops
//! only when the composition root signals shutdown, and the root owns the
//! join handle.

use crate::cache::SnapshotCache;
use crate::upstream::SnapshotSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct Refresher {
    source: Arc<dyn SnapshotSource>,
    cache: SnapshotCache,
    interval: Duration,
}

impl Refresher {
    pub fn new(source: Arc<dyn SnapshotSource>, cache: SnapshotCache, interval: Duration) -> Self {
        Self {
            source,
            cache,
            interval,
        }
    }

    /// One poll cycle: fetch, and on success replace the cache.
    pub async fn run_cycle(&self) {
        match self.source.fetch_snapshot().await {
            Ok(snapshot) => {
                info!("Cache refreshed at {}", snapshot.updated_at);
                self.cache.store(snapshot).await;
            }
            Err(e) => {
                warn!("Refresh cycle failed: {}", e);
            }
        }
    }

    /// Run cycles until the shutdown channel fires.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Refresher running (interval {}s)",
                self.interval.as_secs()
            );
            loop {
                self.run_cycle().await;

                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = shutdown.changed() => {
                        info!("Refresher stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamError;
    use async_trait::async_trait;
    use fleet_common::Snapshot;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Scripted source: pops one outcome per cycle, then keeps failing.
    struct ScriptedSource {
        outcomes: Mutex<Vec<Result<Snapshot, ()>>>,
    }

    impl ScriptedSource {
        fn new(outcomes: Vec<Result<Snapshot, ()>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
            })
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch_snapshot(&self) -> Result<Snapshot, UpstreamError> {
            let mut outcomes = self.outcomes.lock().unwrap();
            match outcomes.pop() {
                Some(Ok(snapshot)) => Ok(snapshot),
                _ => Err(UpstreamError::Malformed {
                    endpoint: "tracker/list",
                    reason: "scripted failure".to_string(),
                }),
            }
        }
    }

    fn snapshot(stamp: &str) -> Snapshot {
        Snapshot {
            trackers: vec![],
            states: BTreeMap::new(),
            zones: vec![],
            updated_at: stamp.to_string(),
        }
    }

    #[tokio::test]
    async fn successful_cycle_stores_exactly_the_fetched_snapshot() {
        let cache = SnapshotCache::new();
        let source = ScriptedSource::new(vec![Ok(snapshot("fresh"))]);
        let refresher = Refresher::new(source, cache.clone(), Duration::ZERO);

        refresher.run_cycle().await;

        let stored = cache.load().await.unwrap();
        assert_eq!(*stored, snapshot("fresh"));
    }

    #[tokio::test]
    async fn failed_cycle_leaves_empty_cache_empty() {
        let cache = SnapshotCache::new();
        let source = ScriptedSource::new(vec![Err(())]);
        let refresher = Refresher::new(source, cache.clone(), Duration::ZERO);

        refresher.run_cycle().await;

        assert!(cache.load().await.is_none());
    }

    #[tokio::test]
    async fn failed_cycle_keeps_the_previous_snapshot() {
        let cache = SnapshotCache::new();
        // Outcomes pop from the back: first a success, then a failure.
        let source = ScriptedSource::new(vec![Err(()), Ok(snapshot("warm"))]);
        let refresher = Refresher::new(source, cache.clone(), Duration::ZERO);

        refresher.run_cycle().await;
        refresher.run_cycle().await;

        assert_eq!(cache.load().await.unwrap().updated_at, "warm");
    }

    #[tokio::test]
    async fn loop_survives_failures_and_stops_on_shutdown() {
        let cache = SnapshotCache::new();
        let source = ScriptedSource::new(vec![Err(()), Err(()), Err(())]);
        let refresher = Refresher::new(source, cache.clone(), Duration::from_millis(1));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = refresher.spawn(shutdown_rx);

        // Let a few failing cycles go by, then signal shutdown.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("refresher did not stop after shutdown signal")
            .unwrap();

        assert!(cache.load().await.is_none());
    }
}
