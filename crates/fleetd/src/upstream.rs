//! Upstream Navixy client
//!
//! One poll cycle is three sequential calls: tracker list, tracker states
//! for exactly the ids just listed, then the zone list with geometry. Any
//! failure at any step abandons the whole cycle; there is no partial
//! snapshot and no retry within a cycle (the next cycle is the retry).
//!
//! The upstream wraps errors in `{"success": false, "status": {...}}`
//! bodies with HTTP 200, so a missing payload key is treated the same as
//! a malformed body.

use crate::config::Config;
use async_trait::async_trait;
use chrono::Local;
use fleet_common::{Snapshot, Tracker, Zone};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Per-request timeout for upstream calls.
const UPSTREAM_TIMEOUT_SECS: u64 = 20;

/// Upstream hard cap on zone list size. Zones beyond this are silently
/// dropped by the API; there is no pagination on this endpoint.
const ZONE_LIST_LIMIT: u32 = 1000;

/// Format of the `updated_at` stamp on a composed snapshot.
const UPDATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Why a poll cycle was abandoned.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("malformed response from {endpoint}: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: String,
    },
}

/// Anything that can produce a full snapshot per cycle.
///
/// The refresher only depends on this, so tests can drive it with a fake
/// source instead of the network.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, UpstreamError>;
}

/// HTTP client against the Navixy v2 API.
pub struct NavixyClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl NavixyClient {
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn tracker_list(&self) -> Result<Vec<Tracker>, UpstreamError> {
        let body = self
            .post_json("tracker/list", json!({ "hash": self.api_key }))
            .await?;
        extract("tracker/list", &body, "list")
    }

    async fn tracker_states(
        &self,
        ids: &[i64],
    ) -> Result<BTreeMap<String, Value>, UpstreamError> {
        // An empty fleet is still a valid cycle; the request goes out with
        // an empty id list and must come back as an empty map.
        let body = self
            .post_json(
                "tracker/get_states",
                json!({ "hash": self.api_key, "trackers": ids }),
            )
            .await?;
        extract("tracker/get_states", &body, "states")
    }

    async fn zone_list(&self) -> Result<Vec<Zone>, UpstreamError> {
        let endpoint = "zone/list";
        let limit = ZONE_LIST_LIMIT.to_string();
        let response = self
            .client
            .get(format!("{}/{}", self.api_url, endpoint))
            .query(&[
                ("hash", self.api_key.as_str()),
                ("with_points", "true"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;
        let body = decode(endpoint, response).await?;
        extract(endpoint, &body, "list")
    }

    async fn post_json(
        &self,
        endpoint: &'static str,
        payload: Value,
    ) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .post(format!("{}/{}", self.api_url, endpoint))
            .json(&payload)
            .send()
            .await?;
        decode(endpoint, response).await
    }
}

#[async_trait]
impl SnapshotSource for NavixyClient {
    async fn fetch_snapshot(&self) -> Result<Snapshot, UpstreamError> {
        let trackers = self.tracker_list().await?;
        debug!("Upstream listed {} trackers", trackers.len());

        let ids: Vec<i64> = trackers.iter().map(|t| t.id).collect();
        let states = self.tracker_states(&ids).await?;
        let zones = self.zone_list().await?;

        Ok(Snapshot {
            trackers,
            states,
            zones,
            updated_at: Local::now().format(UPDATED_AT_FORMAT).to_string(),
        })
    }
}

/// Check the HTTP status and decode the body as JSON.
async fn decode(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status { endpoint, status });
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| UpstreamError::Malformed {
            endpoint,
            reason: format!("body is not JSON: {}", e),
        })?;

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(UpstreamError::Malformed {
            endpoint,
            reason: format!("upstream reported failure: {}", body["status"]),
        });
    }

    Ok(body)
}

/// Pull `key` out of a decoded body and deserialize it.
fn extract<T: DeserializeOwned>(
    endpoint: &'static str,
    body: &Value,
    key: &str,
) -> Result<T, UpstreamError> {
    let payload = body.get(key).ok_or_else(|| UpstreamError::Malformed {
        endpoint,
        reason: format!("missing '{}' field", key),
    })?;

    serde_json::from_value(payload.clone()).map_err(|e| UpstreamError::Malformed {
        endpoint,
        reason: format!("'{}' field has unexpected shape: {}", key, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_reads_tracker_list() {
        let body = json!({
            "success": true,
            "list": [
                {"id": 1, "label": "A"},
                {"id": 2, "label": "B"}
            ]
        });

        let trackers: Vec<Tracker> = extract("tracker/list", &body, "list").unwrap();
        assert_eq!(trackers.len(), 2);
        assert_eq!(trackers[0].id, 1);
    }

    #[test]
    fn extract_rejects_missing_key() {
        let body = json!({"success": true});
        let result: Result<Vec<Tracker>, _> = extract("tracker/list", &body, "list");
        assert!(matches!(
            result,
            Err(UpstreamError::Malformed { endpoint: "tracker/list", .. })
        ));
    }

    #[test]
    fn extract_rejects_wrong_shape() {
        let body = json!({"success": true, "list": "not-a-list"});
        let result: Result<Vec<Tracker>, _> = extract("tracker/list", &body, "list");
        assert!(matches!(result, Err(UpstreamError::Malformed { .. })));
    }

    #[test]
    fn extract_reads_empty_states_map() {
        let body = json!({"success": true, "states": {}});
        let states: BTreeMap<String, Value> =
            extract("tracker/get_states", &body, "states").unwrap();
        assert!(states.is_empty());
    }
}
