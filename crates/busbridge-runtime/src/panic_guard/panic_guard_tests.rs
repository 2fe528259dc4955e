#![allow(non_snake_case)]

use super::*;

#[test]
fn catch_callback_panic___no_panic___returns_ok() {
    let mut ran = false;

    let result = catch_callback_panic("handler for 'a'", || ran = true);

    assert!(result.is_ok());
    assert!(ran);
}

#[test]
fn catch_callback_panic___str_payload___becomes_internal_error() {
    let result = catch_callback_panic("handler for 'a'", || panic!("boom"));

    match result {
        Err(BridgeError::Internal(msg)) => {
            assert!(msg.contains("handler for 'a'"));
            assert!(msg.contains("boom"));
        }
        other => panic!("expected internal error, got {:?}", other),
    }
}

#[test]
fn catch_callback_panic___string_payload___message_preserved() {
    let code = 42;

    let result = catch_callback_panic("reply callback", || panic!("failed with {}", code));

    assert!(matches!(result, Err(BridgeError::Internal(msg)) if msg.contains("failed with 42")));
}
