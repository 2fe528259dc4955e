#![allow(non_snake_case)]

use super::*;
use busbridge_core::BridgeError;
use busbridge_transport::Envelope;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

fn reply(address: &str) -> BridgeMessage {
    BridgeMessage::detached(Envelope::send(address, json!({"msg": "pong"})))
}

fn panicking_reply(_: BridgeMessage) {
    panic!("reply blew up")
}

#[test]
fn ReplyRegistry___register___generates_distinct_addresses() {
    let mut registry = ReplyRegistry::new();

    let first = registry.register(Box::new(|_: BridgeMessage| {}));
    let second = registry.register(Box::new(|_: BridgeMessage| {}));

    assert_ne!(first, second);
    assert!(Uuid::parse_str(&first).is_ok());
    assert_eq!(registry.len(), 2);
}

#[test]
fn ReplyRegistry___resolve___invokes_callback_exactly_once() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let mut registry = ReplyRegistry::new();
    let address = registry.register(Box::new(move |msg: BridgeMessage| {
        sink.lock().push(msg.body().cloned())
    }));

    assert!(registry.resolve(&address, reply(&address)).unwrap());
    assert!(!registry.resolve(&address, reply(&address)).unwrap());

    assert_eq!(*received.lock(), vec![Some(json!({"msg": "pong"}))]);
    assert!(registry.is_empty());
}

#[test]
fn ReplyRegistry___resolve___unknown_address_returns_false() {
    let mut registry = ReplyRegistry::new();

    assert!(!registry.resolve("nobody", reply("nobody")).unwrap());
}

#[test]
fn ReplyRegistry___resolve___panicking_callback_is_removed_and_reported() {
    let mut registry = ReplyRegistry::new();
    let address = registry.register(Box::new(panicking_reply));

    let result = registry.resolve(&address, reply(&address));

    assert!(matches!(result, Err(BridgeError::Internal(_))));
    assert!(!registry.contains(&address));
}

#[test]
fn ReplyRegistry___clear___drops_callbacks_without_invoking() {
    let invoked = Arc::new(Mutex::new(false));
    let flag = invoked.clone();
    let mut registry = ReplyRegistry::new();
    registry.register(Box::new(move |_: BridgeMessage| *flag.lock() = true));
    registry.register(Box::new(|_: BridgeMessage| {}));

    assert_eq!(registry.clear(), 2);

    assert!(registry.is_empty());
    assert!(!*invoked.lock());
}

#[test]
fn ReplyRegistry___remove___drops_single_entry() {
    let mut registry = ReplyRegistry::new();
    let address = registry.register(Box::new(|_: BridgeMessage| {}));

    assert!(registry.remove(&address));
    assert!(!registry.remove(&address));
}
