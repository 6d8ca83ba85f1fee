// crates/podsync-client/src/types.rs

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Configuration for the sync client.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_addr: String,

    /// Seconds between `ping`s. A connection that has been silent for
    /// three intervals is treated as dead.
    pub heartbeat_secs: u64,

    /// First reconnect delay; doubles per failed attempt.
    pub reconnect_initial_backoff_ms: u64,

    /// Upper bound for the reconnect delay.
    pub reconnect_max_backoff_secs: u64,

    /// Pods to watch on start-up.
    pub pods: Vec<String>,

    /// Bookings to watch on start-up.
    pub bookings: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:9100".to_string(),
            heartbeat_secs: 30,
            reconnect_initial_backoff_ms: 500,
            reconnect_max_backoff_secs: 30,
            pods: Vec::new(),
            bookings: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Read a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ClientError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ClientError> {
        Ok(toml::from_str(text)?)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs.max(1))
    }

    /// Delay before reconnect attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let initial = Duration::from_millis(self.reconnect_initial_backoff_ms);
        let max = Duration::from_secs(self.reconnect_max_backoff_secs);
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1).min(16));
        initial.saturating_mul(factor).min(max)
    }
}
