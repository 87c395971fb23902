//! API routes for fleetd

use crate::server::AppState;
use axum::response::{IntoResponse, Response};
use axum::{extract::State, routing::get, Json, Router};
use fleet_common::{HealthResponse, TrackingResponse};
use std::sync::Arc;

type AppStateArc = Arc<AppState>;

pub fn tracking_routes() -> Router<AppStateArc> {
    Router::new().route("/tracking", get(get_tracking))
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(get_health))
}

/// Serve the latest snapshot, or the loading placeholder before the
/// first successful poll cycle. Both are 200s; "not warmed up yet" is a
/// normal state, not a fault.
async fn get_tracking(State(state): State<AppStateArc>) -> Response {
    match state.cache.load().await {
        // Serialize straight through the Arc; handlers never copy the
        // snapshot.
        Some(snapshot) => Json(&*snapshot).into_response(),
        None => Json(TrackingResponse::loading()).into_response(),
    }
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
