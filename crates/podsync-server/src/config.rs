//! Configuration for the podsync TCP server.
//!
//! Either use defaults or override via environment variables:
//!
//! - `PODSYNC_BIND_ADDR`   (default: "0.0.0.0")
//! - `PODSYNC_PORT`        (default: "9100")
//! - `PODSYNC_MAX_CLIENTS` (default: "1024")
//! - `PODSYNC_ROOM_POLICY` (default: "open"; or "pods-only")
//! - `PODSYNC_OUTBOUND_QUEUE` (default: "256")

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::auth::RoomPolicy;

/// Error raised when an environment override cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {key}: {source}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on. `0` lets the OS pick one.
    pub port: u16,

    /// Maximum number of simultaneously connected clients.
    pub max_clients: usize,

    /// Which rooms clients may join.
    pub room_policy: RoomPolicy,

    /// Messages buffered per connection before broadcasts to it are
    /// dropped.
    pub outbound_queue: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 9100,
            max_clients: 1024,
            room_policy: RoomPolicy::Open,
            outbound_queue: 256,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Construct a `Config` from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Ok(Config {
            bind_addr: lookup("PODSYNC_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: read_or_default(&lookup, "PODSYNC_PORT", defaults.port)?,
            max_clients: read_or_default(&lookup, "PODSYNC_MAX_CLIENTS", defaults.max_clients)?,
            room_policy: read_or_default(&lookup, "PODSYNC_ROOM_POLICY", defaults.room_policy)?,
            outbound_queue: read_or_default(
                &lookup,
                "PODSYNC_OUTBOUND_QUEUE",
                defaults.outbound_queue,
            )?,
        })
    }

    /// Loopback config on an OS-assigned port.
    pub fn local_ephemeral() -> Self {
        Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            ..Config::default()
        }
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_or_default<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError {
            key,
            value,
            source: Box::new(e),
        }),
        None => Ok(default),
    }
}
