//! Bridge client configuration

use crate::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bridge server port
pub const DEFAULT_PORT: u16 = 7000;

/// Default keepalive ping interval in milliseconds
pub const DEFAULT_PING_INTERVAL_MS: u64 = 5000;

/// Delay between connect attempts when `reconnectInterval` is not set
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 1000;

/// Configuration for a bridge client
///
/// Field names follow the camelCase keys of the bridge configuration object,
/// so the same document can be read from JSON or TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Bridge server host (required)
    #[serde(default)]
    pub host: String,

    /// Bridge server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of additional connect attempts after the first one fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_attempts: Option<u32>,

    /// Delay between connect attempts in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_interval: Option<u64>,

    /// Per-attempt connect timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u64>,

    /// Keepalive ping interval in milliseconds
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,

    /// Headers merged into every outbound envelope (call-site headers win)
    #[serde(default)]
    pub default_headers: serde_json::Map<String, serde_json::Value>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_ping_interval() -> u64 {
    DEFAULT_PING_INTERVAL_MS
}

impl BridgeConfig {
    /// Create a configuration for the given host with default settings
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            reconnect_attempts: None,
            reconnect_interval: None,
            connection_timeout: None,
            ping_interval: DEFAULT_PING_INTERVAL_MS,
            default_headers: serde_json::Map::new(),
        }
    }

    /// Parse and validate a configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> BridgeResult<Self> {
        let config: Self = serde_json::from_slice(bytes)
            .map_err(|e| BridgeError::ConfigError(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings a client cannot be constructed without
    pub fn validate(&self) -> BridgeResult<()> {
        if self.host.trim().is_empty() {
            return Err(BridgeError::ConfigError(
                "missing required config: [host]".to_string(),
            ));
        }
        if self.ping_interval == 0 {
            return Err(BridgeError::ConfigError(
                "pingInterval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = duration_to_millis(interval);
        self
    }

    /// Retry a failed connect `attempts` more times, waiting `interval` between tries
    pub fn with_reconnect(mut self, attempts: u32, interval: Duration) -> Self {
        self.reconnect_attempts = Some(attempts);
        self.reconnect_interval = Some(duration_to_millis(interval));
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(duration_to_millis(timeout));
        self
    }

    /// Add a header sent with every outbound envelope
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// `host:port` string suitable for a socket connect
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval.unwrap_or(DEFAULT_RECONNECT_INTERVAL_MS))
    }

    pub fn connection_timeout(&self) -> Option<Duration> {
        self.connection_timeout.map(Duration::from_millis)
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
