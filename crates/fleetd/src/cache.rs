//! Single-slot snapshot cache
//!
//! Holds the latest successful snapshot plus the instant it was stored.
//! Written only by the refresher; read by any request handler. The write
//! section is a plain field swap with no await point inside the lock, so
//! readers can never observe a torn snapshot.

use chrono::{DateTime, Utc};
use fleet_common::Snapshot;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct CacheSlot {
    data: Option<Arc<Snapshot>>,
    last_update: Option<DateTime<Utc>>,
}

/// Cheaply clonable handle to the one cache slot of the process.
#[derive(Clone, Default)]
pub struct SnapshotCache {
    inner: Arc<RwLock<CacheSlot>>,
}

impl SnapshotCache {
    /// Create an empty cache. It stays empty until the first successful
    /// poll cycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached snapshot wholesale.
    pub async fn store(&self, snapshot: Snapshot) {
        let mut slot = self.inner.write().await;
        slot.data = Some(Arc::new(snapshot));
        slot.last_update = Some(Utc::now());
    }

    /// Latest snapshot, if any cycle has succeeded yet.
    pub async fn load(&self) -> Option<Arc<Snapshot>> {
        self.inner.read().await.data.clone()
    }

    /// Instant of the last successful replacement.
    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_update
    }
}
