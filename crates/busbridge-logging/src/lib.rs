//! busbridge-logging - Tracing subscriber setup
//!
//! This crate provides:
//! - [`init_logging`] and [`init_logging_from_env`] to install a stderr
//!   subscriber once per process
//! - [`ReloadHandle`] to change the filter while running

mod init;
mod reload;

pub use busbridge_core::LogLevel;
pub use init::{LOG_ENV_VAR, init_logging, init_logging_from_env};
pub use reload::ReloadHandle;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{LogLevel, ReloadHandle, init_logging, init_logging_from_env};
}
