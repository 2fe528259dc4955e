//! Connection settings from a TOML file and command-line overrides

use anyhow::{Context, Result};
use busbridge::BridgeConfig;
use std::path::Path;

/// Load a bridge configuration from a TOML file
///
/// Keys are the camelCase names used by [`BridgeConfig`]:
///
/// ```toml
/// host = "localhost"
/// port = 7000
/// pingInterval = 5000
///
/// [defaultHeaders]
/// token = "abc"
/// ```
pub fn from_file(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config: {:?}", path.as_ref()))?;

    from_str(&content)
}

/// Parse a bridge configuration from TOML text
pub fn from_str(content: &str) -> Result<BridgeConfig> {
    toml::from_str(content).context("Failed to parse config")
}

/// Resolve the effective configuration
///
/// Flags win over the file. Without a file the host defaults to
/// `localhost`.
pub fn resolve(
    file: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<BridgeConfig> {
    let mut config = match file {
        Some(path) => from_file(path)?,
        None => BridgeConfig::new("localhost"),
    };

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    config.validate().context("Invalid bridge configuration")?;
    Ok(config)
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
