//! Dynamic log filter reloading

use busbridge_core::{BridgeError, BridgeResult, LogLevel};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing_subscriber::{EnvFilter, Registry, reload};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Handle for replacing the installed filter
pub struct ReloadHandle {
    handle: Mutex<Option<FilterHandle>>,
}

impl ReloadHandle {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Get the global reload handle
    pub fn global() -> &'static ReloadHandle {
        static INSTANCE: OnceCell<ReloadHandle> = OnceCell::new();
        INSTANCE.get_or_init(ReloadHandle::new)
    }

    pub(crate) fn set_handle(&self, handle: FilterHandle) {
        *self.handle.lock() = Some(handle);
    }

    /// Whether a subscriber has been installed through this handle
    pub fn is_initialized(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Switch every target to `level`
    pub fn reload_level(&self, level: LogLevel) -> BridgeResult<()> {
        self.reload(EnvFilter::new(level_directive(level)))
    }

    /// Replace the filter with `directives`, e.g. `busbridge_runtime=trace,info`
    pub fn reload_directives(&self, directives: &str) -> BridgeResult<()> {
        let filter = EnvFilter::try_new(directives)
            .map_err(|e| BridgeError::ConfigError(format!("invalid log directives: {e}")))?;
        self.reload(filter)
    }

    fn reload(&self, filter: EnvFilter) -> BridgeResult<()> {
        let guard = self.handle.lock();
        let handle = guard
            .as_ref()
            .ok_or_else(|| BridgeError::Internal("logging not initialized".to_string()))?;
        handle
            .reload(filter)
            .map_err(|e| BridgeError::Internal(format!("failed to reload log filter: {e}")))
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter directive enabling `level` and everything more severe
pub(crate) fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
        LogLevel::Off => "off",
    }
}

#[cfg(test)]
#[path = "reload/reload_tests.rs"]
mod reload_tests;
