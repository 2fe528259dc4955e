//! busbridge-core - Core types, errors, and connection state
//!
//! This crate provides the foundational types shared by the busbridge crates:
//! - [`ConnectionState`] for the bridge connection lifecycle
//! - [`BridgeError`] and [`ReplyFailure`] for error handling
//! - [`BridgeConfig`] for client configuration

mod config;
mod error;
mod state;

pub use config::{
    BridgeConfig, DEFAULT_PING_INTERVAL_MS, DEFAULT_PORT, DEFAULT_RECONNECT_INTERVAL_MS,
};
pub use error::{BridgeError, BridgeResult, FailureKind, ReplyFailure};
pub use state::ConnectionState;

/// Log levels understood by the logging setup and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(BridgeError::ConfigError(format!("unknown log level: {other}"))),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BridgeConfig, BridgeError, BridgeResult, ConnectionState, FailureKind, LogLevel,
        ReplyFailure,
    };
}

#[cfg(test)]
mod lib_tests;
