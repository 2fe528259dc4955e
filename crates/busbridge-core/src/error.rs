//! Error types for busbridge clients

use thiserror::Error;

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Error type for bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Operation attempted while the connection is not in the required state
    #[error("invalid connection state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Operation attempted with a missing or empty address
    #[error("address must not be empty")]
    NullAddress,

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Envelope could not be serialized into a frame
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Inbound frame payload was not a JSON object
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Connect failure or I/O error on the established transport
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The remote bus answered with an `err` envelope nobody was waiting for
    #[error("remote failure: {0}")]
    Remote(ReplyFailure),

    /// Reply attempted on a message that carried no reply address
    #[error("cannot reply: message has no reply address")]
    NoReplyAddress,

    /// The connection ended before the operation could complete
    #[error("connection closed")]
    ConnectionClosed,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Returns a stable numeric code for this error
    pub fn error_code(&self) -> u32 {
        match self {
            BridgeError::InvalidState { .. } => 1,
            BridgeError::NullAddress => 2,
            BridgeError::ConfigError(_) => 3,
            BridgeError::SerializationError(_) => 4,
            BridgeError::DecodeError(_) => 5,
            BridgeError::Transport(_) => 6,
            BridgeError::Remote(_) => 7,
            BridgeError::NoReplyAddress => 8,
            BridgeError::ConnectionClosed => 9,
            BridgeError::Internal(_) => 10,
        }
    }

    /// Whether this error is a gating error (the operation was dropped,
    /// the connection itself is unaffected)
    pub fn is_gating(&self) -> bool {
        matches!(
            self,
            BridgeError::InvalidState { .. } | BridgeError::NullAddress
        )
    }

    /// Create an invalid state error for an operation that requires `expected`
    pub fn invalid_state(expected: impl std::fmt::Display, actual: impl std::fmt::Display) -> Self {
        BridgeError::InvalidState {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            BridgeError::DecodeError(err.to_string())
        } else {
            BridgeError::SerializationError(err.to_string())
        }
    }
}

/// Why the remote bus failed to deliver or process a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The reply did not arrive in time
    Timeout,
    /// No consumer was registered for the address
    NoHandlers,
    /// The consumer explicitly failed the message
    RecipientFailure,
}

impl FailureKind {
    /// Map the wire `failureType` integer; unknown values fall back to
    /// [`FailureKind::RecipientFailure`]
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => FailureKind::Timeout,
            1 => FailureKind::NoHandlers,
            _ => FailureKind::RecipientFailure,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            FailureKind::Timeout => 0,
            FailureKind::NoHandlers => 1,
            FailureKind::RecipientFailure => 2,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "TIMEOUT"),
            FailureKind::NoHandlers => write!(f, "NO_HANDLERS"),
            FailureKind::RecipientFailure => write!(f, "RECIPIENT_FAILURE"),
        }
    }
}

/// Failure details carried by an inbound `err` envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyFailure {
    pub kind: FailureKind,
    pub code: i64,
    pub message: String,
}

impl ReplyFailure {
    pub fn new(kind: FailureKind, code: i64, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ReplyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {}): {}", self.kind, self.code, self.message)
    }
}
