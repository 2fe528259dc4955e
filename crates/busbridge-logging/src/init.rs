//! Subscriber installation

use crate::reload::{ReloadHandle, level_directive};
use busbridge_core::LogLevel;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, reload};

/// Environment variable holding filter directives for [`init_logging_from_env`]
pub const LOG_ENV_VAR: &str = "BUSBRIDGE_LOG";

/// Install a stderr subscriber filtering at `level`
///
/// Returns `false` if a global subscriber was already set. If it was set by
/// this crate, the level is applied to it instead.
pub fn init_logging(level: LogLevel) -> bool {
    install(EnvFilter::new(level_directive(level)), level)
}

/// Like [`init_logging`], but directives in `BUSBRIDGE_LOG` take precedence
/// over `default_level`
pub fn init_logging_from_env(default_level: LogLevel) -> bool {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .try_from_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(default_level)));
    install(filter, default_level)
}

fn install(filter: EnvFilter, level: LogLevel) -> bool {
    let handle = ReloadHandle::global();
    if handle.is_initialized() {
        if let Err(err) = handle.reload_level(level) {
            tracing::warn!(error = %err, "Could not apply log level");
        }
        return false;
    }

    let (filter, reload_handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true));

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    handle.set_handle(reload_handle);
    true
}

#[cfg(test)]
#[path = "init/init_tests.rs"]
mod init_tests;
