#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// LogLevel tests

#[test]
fn LogLevel___ordering___trace_less_than_debug() {
    assert!(LogLevel::Trace < LogLevel::Debug);
}

#[test]
fn LogLevel___ordering___error_less_than_off() {
    assert!(LogLevel::Error < LogLevel::Off);
}

#[test_case("trace", LogLevel::Trace)]
#[test_case("DEBUG", LogLevel::Debug)]
#[test_case("Info", LogLevel::Info)]
#[test_case("warning", LogLevel::Warn)]
#[test_case("error", LogLevel::Error)]
#[test_case("off", LogLevel::Off)]
fn LogLevel___from_str___parses_case_insensitively(input: &str, expected: LogLevel) {
    let level: LogLevel = input.parse().unwrap();

    assert_eq!(level, expected);
}

#[test]
fn LogLevel___from_str___unknown_level_is_config_error() {
    let result = "verbose".parse::<LogLevel>();

    assert!(matches!(result, Err(BridgeError::ConfigError(_))));
}

#[test]
fn LogLevel___display___uppercase_name() {
    assert_eq!(LogLevel::Warn.to_string(), "WARN");
}
