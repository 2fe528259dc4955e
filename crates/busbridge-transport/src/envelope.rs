//! Envelope shapes exchanged over the bridge

use busbridge_core::{FailureKind, ReplyFailure};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Header object carried by every envelope
pub type Headers = Map<String, Value>;

/// Envelope `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeType {
    /// Point-to-point message, optionally expecting a reply
    Send,
    /// Fan-out message
    Publish,
    /// Subscribe this connection to an address
    Register,
    /// Unsubscribe this connection from an address
    Unregister,
    /// Keepalive
    Ping,
    /// Failure reply (inbound only)
    Err,
    /// Any type this client does not know about
    #[serde(other)]
    Unknown,
}

impl EnvelopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeType::Send => "send",
            EnvelopeType::Publish => "publish",
            EnvelopeType::Register => "register",
            EnvelopeType::Unregister => "unregister",
            EnvelopeType::Ping => "ping",
            EnvelopeType::Err => "err",
            EnvelopeType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EnvelopeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol message
///
/// Every field is optional on decode: presence is checked by whoever routes
/// the envelope, not by the codec. Fields this client does not model are kept
/// in `extra` and written back out on encode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EnvelopeType>,

    /// Destination address (outbound) or origin/reply address (inbound)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,

    /// Application payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// Address the remote side should send its reply to
    #[serde(
        rename = "replyAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reply_address: Option<String>,

    #[serde(
        rename = "failureType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub failure_type: Option<i64>,

    #[serde(
        rename = "failureCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub failure_code: Option<i64>,

    /// Failure description on `err` envelopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    fn of_kind(kind: EnvelopeType) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// Point-to-point message
    pub fn send(address: impl Into<String>, body: Value) -> Self {
        Self {
            address: Some(address.into()),
            body: Some(body),
            ..Self::of_kind(EnvelopeType::Send)
        }
    }

    /// Fan-out message
    pub fn publish(address: impl Into<String>, body: Value) -> Self {
        Self {
            address: Some(address.into()),
            body: Some(body),
            ..Self::of_kind(EnvelopeType::Publish)
        }
    }

    pub fn register(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::of_kind(EnvelopeType::Register)
        }
    }

    pub fn unregister(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::of_kind(EnvelopeType::Unregister)
        }
    }

    pub fn ping() -> Self {
        Self::of_kind(EnvelopeType::Ping)
    }

    /// Failure reply, as produced by the remote side
    pub fn failure(
        address: impl Into<String>,
        failure_type: i64,
        failure_code: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            address: Some(address.into()),
            failure_type: Some(failure_type),
            failure_code: Some(failure_code),
            message: Some(message.into()),
            ..Self::of_kind(EnvelopeType::Err)
        }
    }

    /// Read an envelope out of a decoded JSON object
    ///
    /// Never fails: a known field whose value has an unexpected JSON type is
    /// left in `extra` and reads as absent.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            kind: take_field(&mut map, "type"),
            address: take_field(&mut map, "address"),
            headers: take_field(&mut map, "headers"),
            body: take_field(&mut map, "body"),
            reply_address: take_field(&mut map, "replyAddress"),
            failure_type: take_field(&mut map, "failureType"),
            failure_code: take_field(&mut map, "failureCode"),
            message: take_field(&mut map, "message"),
            extra: map,
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_reply_address(mut self, reply_address: impl Into<String>) -> Self {
        self.reply_address = Some(reply_address.into());
        self
    }

    /// Envelope type, [`EnvelopeType::Unknown`] when absent
    pub fn kind(&self) -> EnvelopeType {
        self.kind.unwrap_or(EnvelopeType::Unknown)
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn reply_address(&self) -> Option<&str> {
        self.reply_address.as_deref()
    }

    /// True for `err` envelopes
    pub fn is_failure(&self) -> bool {
        self.kind == Some(EnvelopeType::Err)
    }

    /// Failure details of an `err` envelope
    ///
    /// A missing `failureType` is read as a recipient failure and a missing
    /// `failureCode` as `-1`.
    pub fn failure_details(&self) -> Option<ReplyFailure> {
        if !self.is_failure() {
            return None;
        }
        let kind = self
            .failure_type
            .map(FailureKind::from_code)
            .unwrap_or(FailureKind::RecipientFailure);
        Some(ReplyFailure::new(
            kind,
            self.failure_code.unwrap_or(-1),
            self.message.clone().unwrap_or_default(),
        ))
    }
}

/// Remove `key` and parse it; on a type mismatch the raw value is put back
fn take_field<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = map.remove(key)?;
    match Option::<T>::deserialize(&value) {
        Ok(parsed) => parsed,
        Err(_) => {
            map.insert(key.to_owned(), value);
            None
        }
    }
}

/// Merge call-site headers over the per-client defaults
///
/// Keys present in `overrides` replace the default value.
pub fn merge_headers(defaults: &Headers, overrides: Option<&Headers>) -> Headers {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
#[path = "envelope/envelope_tests.rs"]
mod envelope_tests;
