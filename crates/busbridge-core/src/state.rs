//! Bridge connection state machine

use serde::{Deserialize, Serialize};

/// Connection states of a bridge client
///
/// State transitions:
/// ```text
/// Closed → Connecting → Open → Closing → Closed
///              │          │                 ↑
///              │          └─────────────────┤ (end-of-stream / transport error)
///              └────────────────────────────┘ (connect failed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Transport connect in progress
    Connecting,
    /// Connected; outbound protocol operations are accepted
    Open,
    /// `close()` was requested, the transport is being shut down
    Closing,
    /// No transport; either never connected or terminated
    #[default]
    Closed,
}

impl ConnectionState {
    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Closed, Connecting)
                | (Connecting, Open)
                | (Connecting, Closing)
                | (Connecting, Closed)
                | (Open, Closing)
                | (Open, Closed)
                | (Closing, Closed)
        )
    }

    /// Check if outbound protocol operations are accepted in this state
    pub fn can_send(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Check if the connection has been torn down or is being torn down
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closing | ConnectionState::Closed)
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Transport connect in progress",
            ConnectionState::Open => "Connection is open and ready",
            ConnectionState::Closing => "Connection is shutting down",
            ConnectionState::Closed => "Connection is closed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Closing => write!(f, "Closing"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}
