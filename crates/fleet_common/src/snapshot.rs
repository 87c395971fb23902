//! Composed tracking snapshot
//!
//! One successful poll cycle against the upstream API produces one
//! `Snapshot`. Snapshots are immutable once built and replaced wholesale,
//! never merged field-by-field. Upstream records carry plenty of fields we
//! do not interpret (device metadata, group info, zone styling); those are
//! kept verbatim through flattened maps so the frontend sees exactly what
//! the upstream sent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A tracked device/vehicle as reported by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    pub id: i64,
    /// Remaining upstream fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A single vertex of a zone polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePoint {
    pub lat: f64,
    pub lng: f64,
}

/// A named geofenced area with optional polygon geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<ZonePoint>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// The immutable result of one successful poll cycle.
///
/// `states` is keyed by stringified tracker id, exactly as the upstream
/// returns it. `updated_at` is a human-readable local timestamp stamped
/// when the snapshot was composed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub trackers: Vec<Tracker>,
    pub states: BTreeMap<String, Value>,
    pub zones: Vec<Zone>,
    pub updated_at: String,
}
