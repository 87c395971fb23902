//! Response types for the local HTTP API

use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// Body of `GET /tracking`.
///
/// Until the first successful poll cycle the daemon serves a loading
/// placeholder; this is a normal transient state, not a fault, so it is
/// served with a 200. Once warm, the latest snapshot is served verbatim
/// at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackingResponse {
    Loading { status: String, message: String },
    Ready(Snapshot),
}

impl TrackingResponse {
    pub fn loading() -> Self {
        Self::Loading {
            status: "loading".to_string(),
            message: "Data not ready yet".to_string(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
