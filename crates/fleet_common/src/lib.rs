//! Shared types for fleetd
//!
//! Data model for the composed tracking snapshot plus the response
//! types served on the local HTTP API.

pub mod api;
pub mod snapshot;

pub use api::{HealthResponse, TrackingResponse};
pub use snapshot::{Snapshot, Tracker, Zone, ZonePoint};
