//! Client configuration.
//!
//! Configuration comes from the host application: either filled in
//! directly, or loaded from `ARCAM_*` environment variables with
//! per-key fallbacks to the defaults.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use arcam_protocol::DEFAULT_PORT;

/// Connection configuration for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Device host name or IP address.
    pub host: String,
    /// TCP control port.
    pub port: u16,
    /// Bound on connection establishment and on each command round trip.
    pub timeout: Duration,
    /// Delay before the first reconnect attempt; doubles per failed attempt.
    pub reconnect_delay_base: Duration,
    /// Reconnect attempts before giving up.
    pub max_reconnect_attempts: u32,
    /// Broadcast listener poll interval. Internal pacing, not a
    /// user-facing timeout.
    pub broadcast_poll_interval: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(3),
            reconnect_delay_base: Duration::from_secs(1),
            max_reconnect_attempts: 5,
            broadcast_poll_interval: Duration::from_millis(100),
        }
    }
}

impl ConnectionConfig {
    /// Configuration for `host` with protocol defaults for everything else.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `ARCAM_HOST`, `ARCAM_PORT`, `ARCAM_TIMEOUT_MS`,
    /// `ARCAM_RECONNECT_BASE_MS` and `ARCAM_MAX_RECONNECT_ATTEMPTS`,
    /// falling back to defaults for anything absent or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            host: std::env::var("ARCAM_HOST").unwrap_or(defaults.host),
            port: env_parse("ARCAM_PORT", defaults.port),
            timeout: Duration::from_millis(env_parse(
                "ARCAM_TIMEOUT_MS",
                defaults.timeout.as_millis() as u64,
            )),
            reconnect_delay_base: Duration::from_millis(env_parse(
                "ARCAM_RECONNECT_BASE_MS",
                defaults.reconnect_delay_base.as_millis() as u64,
            )),
            max_reconnect_attempts: env_parse(
                "ARCAM_MAX_RECONNECT_ATTEMPTS",
                defaults.max_reconnect_attempts,
            ),
            broadcast_poll_interval: defaults.broadcast_poll_interval,
        };

        debug!(
            "configuration from environment: host={}, port={}",
            config.host, config.port
        );
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
