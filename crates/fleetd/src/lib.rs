//! fleetd - local fleet-tracking cache daemon
//!
//! Periodically polls the Navixy API (tracker list, tracker states,
//! geofence zones), keeps the latest successful snapshot in memory, and
//! re-serves it over a local HTTP API next to the static frontend bundle.

pub mod cache;
pub mod config;
pub mod refresher;
pub mod routes;
pub mod server;
pub mod upstream;
