//! Frame codec trait and JSON implementation
//!
//! A frame is a 4-byte big-endian payload length followed by exactly that
//! many bytes of UTF-8 JSON.

use crate::Envelope;
use busbridge_core::BridgeError;
use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;
use thiserror::Error;

/// Size of the big-endian length prefix in front of every payload
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("frame payload of {0} bytes exceeds the 4-byte length prefix")]
    FrameTooLarge(usize),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CodecError::Deserialization(err.to_string())
        } else {
            CodecError::Serialization(err.to_string())
        }
    }
}

impl From<CodecError> for BridgeError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Deserialization(_) | CodecError::InvalidFormat(_) => {
                BridgeError::DecodeError(err.to_string())
            }
            CodecError::Serialization(_) | CodecError::FrameTooLarge(_) => {
                BridgeError::SerializationError(err.to_string())
            }
        }
    }
}

/// Trait for turning envelopes into frames and frame payloads into envelopes
pub trait FrameCodec: Send + Sync {
    /// Encode an envelope into a complete frame, length prefix included
    fn encode(&self, envelope: &Envelope) -> Result<Bytes, CodecError>;

    /// Decode a frame payload (length prefix already stripped)
    fn decode(&self, payload: &[u8]) -> Result<Envelope, CodecError>;

    /// Get the content type of frame payloads
    fn content_type(&self) -> &'static str;
}

/// JSON frame codec using serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFrameCodec;

impl JsonFrameCodec {
    pub fn new() -> Self {
        Self
    }
}

impl FrameCodec for JsonFrameCodec {
    fn encode(&self, envelope: &Envelope) -> Result<Bytes, CodecError> {
        let mut frame = BytesMut::with_capacity(128);
        frame.put_u32(0);
        serde_json::to_writer((&mut frame).writer(), envelope)?;

        let payload_len = frame.len() - LENGTH_PREFIX_SIZE;
        let prefix =
            u32::try_from(payload_len).map_err(|_| CodecError::FrameTooLarge(payload_len))?;
        frame[..LENGTH_PREFIX_SIZE].copy_from_slice(&prefix.to_be_bytes());

        Ok(frame.freeze())
    }

    fn decode(&self, payload: &[u8]) -> Result<Envelope, CodecError> {
        match serde_json::from_slice::<Value>(payload)? {
            Value::Object(map) => Ok(Envelope::from_map(map)),
            other => Err(CodecError::InvalidFormat(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
