//! Configuration for fleetd
//!
//! Everything comes from the environment, with working defaults for local
//! use. A malformed value falls back to the default with a warning rather
//! than refusing to start.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default upstream API base URL (EU cluster).
pub const DEFAULT_API_URL: &str = "https://api.eu.navixy.com/v2";

/// Default seconds between poll cycles.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Default local listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

/// Default directory holding the frontend bundle.
pub const DEFAULT_FRONTEND_DIR: &str = "./frontend";

#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API base URL, without trailing slash.
    pub api_url: String,
    /// Shared secret used to authenticate every upstream call.
    pub api_key: String,
    /// Pause between poll cycles. Zero is allowed (used by tests).
    pub refresh_interval: Duration,
    /// Local address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Directory the static frontend bundle is served from.
    pub frontend_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            listen_addr: DEFAULT_LISTEN_ADDR.parse().unwrap(),
            frontend_dir: PathBuf::from(DEFAULT_FRONTEND_DIR),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let refresh_interval = match lookup("CACHE_INTERVAL") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    warn!(
                        "Invalid CACHE_INTERVAL '{}', using default {}s",
                        raw, DEFAULT_REFRESH_INTERVAL_SECS
                    );
                    defaults.refresh_interval
                }
            },
            None => defaults.refresh_interval,
        };

        let listen_addr = match lookup("FLEETD_LISTEN") {
            Some(raw) => match raw.parse::<SocketAddr>() {
                Ok(addr) => addr,
                Err(_) => {
                    warn!(
                        "Invalid FLEETD_LISTEN '{}', using default {}",
                        raw, DEFAULT_LISTEN_ADDR
                    );
                    defaults.listen_addr
                }
            },
            None => defaults.listen_addr,
        };

        Self {
            api_url: lookup("NAVIXY_API_URL").unwrap_or(defaults.api_url),
            api_key: lookup("NAVIXY_API_KEY").unwrap_or(defaults.api_key),
            refresh_interval,
            listen_addr,
            frontend_dir: lookup("FLEETD_FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.frontend_dir),
        }
    }

    /// API key safe for logging. Counts characters, not bytes, so a key
    /// containing multi-byte UTF-8 cannot panic the startup log line.
    pub fn redacted_key(&self) -> String {
        if self.api_key.chars().count() <= 4 {
            "<unset>".to_string()
        } else {
            let prefix: String = self.api_key.chars().take(4).collect();
            format!("{}…", prefix)
        }
    }
}
