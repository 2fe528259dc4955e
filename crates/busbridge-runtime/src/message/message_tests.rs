#![allow(non_snake_case)]

use super::*;
use crate::listeners::Listeners;
use busbridge_core::{ConnectionState, FailureKind};
use serde::Deserialize;
use serde_json::json;

#[test]
fn BridgeMessage___succeeded___true_for_plain_message() {
    let message = BridgeMessage::detached(Envelope::send("a", json!({"k": 1})));

    assert!(message.succeeded());
    assert!(!message.failed());
    assert!(message.cause().is_none());
}

#[test]
fn BridgeMessage___cause___reports_failure_details() {
    let message = BridgeMessage::detached(Envelope::failure("R", 1, 404, "no handler"));

    assert!(message.failed());
    let cause = message.cause().unwrap();
    assert_eq!(cause.kind(), FailureKind::NoHandlers);
    assert_eq!(cause.code(), 404);
    assert_eq!(cause.message(), "no handler");
}

#[test]
fn BridgeMessage___accessors___expose_envelope_fields() {
    let mut headers = Headers::new();
    headers.insert("h".into(), json!("v"));
    let envelope = Envelope::send("orders", json!({"id": 7}))
        .with_headers(headers)
        .with_reply_address("R1");

    let message = BridgeMessage::detached(envelope);

    assert_eq!(message.address(), Some("orders"));
    assert_eq!(message.reply_address(), Some("R1"));
    assert_eq!(message.body(), Some(&json!({"id": 7})));
    assert_eq!(message.headers().unwrap()["h"], json!("v"));
}

#[test]
fn BridgeMessage___body_as___deserializes_typed_body() {
    #[derive(Deserialize)]
    struct Order {
        id: u32,
    }
    let message = BridgeMessage::detached(Envelope::send("orders", json!({"id": 7})));

    let order: Order = message.body_as().unwrap();

    assert_eq!(order.id, 7);
}

#[test]
fn BridgeMessage___reply___without_reply_address_fails() {
    let message = BridgeMessage::detached(Envelope::send("a", json!({})));

    let result = message.reply(json!({"ok": true}));

    assert!(matches!(result, Err(BridgeError::NoReplyAddress)));
}

#[test]
fn BridgeMessage___reply___detached_message_fails_with_connection_closed() {
    let message = BridgeMessage::detached(Envelope::send("a", json!({})).with_reply_address("R"));

    let result = message.reply(json!({"ok": true}));

    assert!(matches!(result, Err(BridgeError::ConnectionClosed)));
}

fn open_shared() -> Arc<Shared> {
    let shared = Arc::new(Shared::new(Listeners::default()));
    shared.transition(ConnectionState::Connecting);
    shared.transition(ConnectionState::Open);
    shared
}

#[test]
fn BridgeMessage___reply___routes_send_to_reply_address() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
    let replier = Replier::new(tx.downgrade(), open_shared());
    let message = BridgeMessage::new(
        Envelope::send("a", json!({})).with_reply_address("R"),
        Some(replier),
    );

    message.reply(json!({"ok": true})).unwrap();

    match rx.try_recv() {
        Ok(Command::Send { address, body, .. }) => {
            assert_eq!(address, "R");
            assert_eq!(body, json!({"ok": true}));
        }
        _ => panic!("expected a send command"),
    }
}

#[test]
fn BridgeMessage___reply___after_every_handle_dropped_fails_with_connection_closed() {
    let (tx, _rx) = mpsc::unbounded_channel::<Command>();
    let replier = Replier::new(tx.downgrade(), open_shared());
    let message = BridgeMessage::new(
        Envelope::send("a", json!({})).with_reply_address("R"),
        Some(replier),
    );

    drop(tx);

    assert!(matches!(
        message.reply(json!({})),
        Err(BridgeError::ConnectionClosed)
    ));
}
