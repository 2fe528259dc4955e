#![allow(non_snake_case)]

use super::*;
use serde_json::json;
use test_case::test_case;

// Envelope construction

#[test]
fn Envelope___send___sets_type_address_and_body() {
    let envelope = Envelope::send("echo", json!({"msg": "ping"}));

    assert_eq!(envelope.kind(), EnvelopeType::Send);
    assert_eq!(envelope.address(), Some("echo"));
    assert_eq!(envelope.body, Some(json!({"msg": "ping"})));
    assert!(envelope.reply_address.is_none());
}

#[test]
fn Envelope___register___has_no_body() {
    let envelope = Envelope::register("news");

    assert_eq!(envelope.kind(), EnvelopeType::Register);
    assert!(envelope.body.is_none());
}

#[test]
fn Envelope___ping___serializes_to_type_only() {
    let json = serde_json::to_value(Envelope::ping()).unwrap();

    assert_eq!(json, json!({"type": "ping"}));
}

#[test]
fn Envelope___with_reply_address___serialized_as_camel_case() {
    let envelope = Envelope::send("echo", json!({})).with_reply_address("R");

    let json = serde_json::to_value(&envelope).unwrap();

    assert_eq!(json["replyAddress"], "R");
    assert!(json.get("reply_address").is_none());
}

#[test]
fn Envelope___failure___serializes_failure_fields() {
    let envelope = Envelope::failure("R", 1, 404, "no handler");

    let json = serde_json::to_value(&envelope).unwrap();

    assert_eq!(
        json,
        json!({
            "type": "err",
            "address": "R",
            "failureType": 1,
            "failureCode": 404,
            "message": "no handler"
        })
    );
}

// Decoding shapes

#[test]
fn Envelope___deserialize___unknown_type_maps_to_unknown() {
    let envelope: Envelope = serde_json::from_value(json!({"type": "subscribe"})).unwrap();

    assert_eq!(envelope.kind(), EnvelopeType::Unknown);
}

#[test]
fn Envelope___deserialize___missing_type_maps_to_unknown() {
    let envelope: Envelope = serde_json::from_value(json!({"address": "a"})).unwrap();

    assert!(envelope.kind.is_none());
    assert_eq!(envelope.kind(), EnvelopeType::Unknown);
}

#[test]
fn Envelope___deserialize___keeps_unmodelled_fields() {
    let envelope: Envelope =
        serde_json::from_value(json!({"type": "send", "address": "a", "priority": 3})).unwrap();

    assert_eq!(envelope.extra["priority"], 3);

    let back = serde_json::to_value(&envelope).unwrap();
    assert_eq!(back["priority"], 3);
}

#[test_case("send", EnvelopeType::Send)]
#[test_case("publish", EnvelopeType::Publish)]
#[test_case("register", EnvelopeType::Register)]
#[test_case("unregister", EnvelopeType::Unregister)]
#[test_case("ping", EnvelopeType::Ping)]
#[test_case("err", EnvelopeType::Err)]
fn EnvelopeType___deserialize___wire_names(name: &str, expected: EnvelopeType) {
    let kind: EnvelopeType = serde_json::from_value(json!(name)).unwrap();

    assert_eq!(kind, expected);
    assert_eq!(kind.as_str(), name);
}

// Failure details

#[test]
fn Envelope___failure_details___none_for_non_err() {
    let envelope = Envelope::send("a", json!({}));

    assert!(envelope.failure_details().is_none());
}

#[test]
fn Envelope___failure_details___reads_code_and_message() {
    let envelope = Envelope::failure("R", 1, 404, "no handler");

    let failure = envelope.failure_details().unwrap();

    assert_eq!(failure.kind(), FailureKind::NoHandlers);
    assert_eq!(failure.code(), 404);
    assert_eq!(failure.message(), "no handler");
}

#[test]
fn Envelope___failure_details___missing_type_defaults_to_recipient_failure() {
    let envelope: Envelope =
        serde_json::from_value(json!({"type": "err", "address": "R", "failureCode": 5})).unwrap();

    let failure = envelope.failure_details().unwrap();

    assert_eq!(failure.kind(), FailureKind::RecipientFailure);
    assert_eq!(failure.code(), 5);
    assert_eq!(failure.message(), "");
}

// merge_headers

#[test]
fn merge_headers___call_site_wins_on_collision() {
    let defaults = json!({"a": 1, "b": 2}).as_object().cloned().unwrap();
    let overrides = json!({"b": 20, "c": 30}).as_object().cloned().unwrap();

    let merged = merge_headers(&defaults, Some(&overrides));

    assert_eq!(Value::Object(merged), json!({"a": 1, "b": 20, "c": 30}));
}

#[test]
fn merge_headers___no_overrides___returns_defaults() {
    let defaults = json!({"a": 1}).as_object().cloned().unwrap();

    let merged = merge_headers(&defaults, None);

    assert_eq!(merged, defaults);
}
