#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test_case(LogLevel::Trace, "trace")]
#[test_case(LogLevel::Debug, "debug")]
#[test_case(LogLevel::Info, "info")]
#[test_case(LogLevel::Warn, "warn")]
#[test_case(LogLevel::Error, "error")]
#[test_case(LogLevel::Off, "off")]
fn level_directive___maps_each_level(level: LogLevel, expected: &str) {
    assert_eq!(level_directive(level), expected);
}

#[test]
fn ReloadHandle___reload_level___uninitialized_handle_fails() {
    let handle = ReloadHandle::new();

    let result = handle.reload_level(LogLevel::Debug);

    assert!(matches!(result, Err(BridgeError::Internal(_))));
    assert!(!handle.is_initialized());
}

#[test]
fn ReloadHandle___reload_directives___invalid_directive_is_config_error() {
    let handle = ReloadHandle::new();

    let result = handle.reload_directives("busbridge=notalevel");

    assert!(matches!(result, Err(BridgeError::ConfigError(_))));
}

#[test]
fn ReloadHandle___reload_level___installed_handle_accepts_new_level() {
    let (_layer, reload_handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
    let handle = ReloadHandle::new();
    handle.set_handle(reload_handle);

    let result = handle.reload_level(LogLevel::Trace);

    assert!(result.is_ok());
}
