//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default interval between traffic refreshes (seconds).
pub const DEFAULT_TRAFFIC_REFRESH_SECS: u64 = 300;

/// Error reading server configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Settings for the HTTP server binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// JSON road network graph (`ROUTE_NETWORK_PATH`)
    pub network_path: PathBuf,

    /// Optional JSON traffic snapshot (`TRAFFIC_SNAPSHOT_PATH`)
    pub traffic_path: Option<PathBuf>,

    /// Listen address (`BIND_ADDR`)
    pub bind_addr: SocketAddr,

    /// How often to reload traffic (`TRAFFIC_REFRESH_SECS`)
    pub traffic_refresh: Duration,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let network_path = lookup("ROUTE_NETWORK_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("ROUTE_NETWORK_PATH"))?;

        let traffic_path = lookup("TRAFFIC_SNAPSHOT_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind.clone(),
        })?;

        let traffic_refresh = match lookup("TRAFFIC_REFRESH_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    name: "TRAFFIC_REFRESH_SECS",
                    value,
                })?,
            None => DEFAULT_TRAFFIC_REFRESH_SECS,
        };

        Ok(Self {
            network_path,
            traffic_path,
            bind_addr,
            traffic_refresh: Duration::from_secs(traffic_refresh),
        })
    }
}
