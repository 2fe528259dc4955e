#![allow(non_snake_case)]

use super::*;

// The global subscriber can be set once per test binary, so installation and
// re-initialization are covered by a single test.
#[test]
fn init_logging___second_call_reloads_instead_of_installing() {
    let first = init_logging(LogLevel::Info);
    let second = init_logging(LogLevel::Debug);

    assert!(first);
    assert!(!second);
    assert!(ReloadHandle::global().is_initialized());
    assert!(ReloadHandle::global().reload_directives("busbridge_runtime=trace,warn").is_ok());
}
