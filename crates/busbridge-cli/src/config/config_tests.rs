#![allow(non_snake_case)]

use super::*;
use std::io::Write;
use std::time::Duration;

#[test]
fn from_str___camel_case_keys___parsed() {
    let toml = r#"
host = "bridge.internal"
port = 7100
pingInterval = 2000
reconnectAttempts = 3

[defaultHeaders]
token = "abc"
"#;

    let config = from_str(toml).unwrap();

    assert_eq!(config.host, "bridge.internal");
    assert_eq!(config.port, 7100);
    assert_eq!(config.ping_interval(), Duration::from_millis(2000));
    assert_eq!(config.reconnect_attempts, Some(3));
    assert_eq!(config.default_headers["token"], serde_json::json!("abc"));
}

#[test]
fn from_str___defaults_apply_for_missing_keys() {
    let config = from_str(r#"host = "h""#).unwrap();

    assert_eq!(config.port, 7000);
    assert_eq!(config.ping_interval(), Duration::from_millis(5000));
}

#[test]
fn from_str___invalid_toml___fails() {
    let result = from_str("host = ");

    assert!(result.is_err());
}

#[test]
fn from_file___reads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "host = \"from-file\"\nport = 9000").unwrap();

    let config = from_file(file.path()).unwrap();

    assert_eq!(config.address(), "from-file:9000");
}

#[test]
fn from_file___missing_file___fails_with_path_in_message() {
    let result = from_file("/nonexistent/busbridge.toml");

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("busbridge.toml"));
}

#[test]
fn resolve___flags_override_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "host = \"from-file\"\nport = 9000").unwrap();

    let config = resolve(Some(file.path()), Some("flag-host".into()), None).unwrap();

    assert_eq!(config.host, "flag-host");
    assert_eq!(config.port, 9000);
}

#[test]
fn resolve___no_file_defaults_to_localhost() {
    let config = resolve(None, None, Some(7001)).unwrap();

    assert_eq!(config.address(), "localhost:7001");
}

#[test]
fn resolve___blank_host_is_rejected() {
    let result = resolve(None, Some("  ".into()), None);

    assert!(result.is_err());
}
