//! # busbridge
//!
//! Async client for event-bus bridges that speak length-prefixed JSON over
//! TCP.
//!
//! A client can:
//! - send point-to-point messages, optionally waiting for a single reply
//! - publish to every subscriber of an address
//! - register handlers for inbound messages on an address
//! - keep the connection alive with periodic pings
//!
//! ## Quick Start
//!
//! ```no_run
//! use busbridge::prelude::*;
//! use serde_json::json;
//!
//! # async fn run() -> BridgeResult<()> {
//! let client = BridgeClient::builder(BridgeConfig::new("localhost").with_port(7000))?
//!     .exception_handler(|err| tracing::warn!(error = %err, "bridge error"))
//!     .connect();
//! client.ready().await?;
//!
//! client.register_handler("news", |message: &BridgeMessage| {
//!     println!("news: {:?}", message.body());
//! });
//!
//! let reply = client.request("echo", json!({"msg": "ping"})).await?;
//! println!("reply: {:?}", reply.body());
//!
//! client.close();
//! client.closed().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`busbridge_core`] - Errors, configuration and connection state
//! - [`busbridge_transport`] - Envelopes, frame codec and reassembly
//! - [`busbridge_runtime`] - Connection worker and client handle
//! - [`busbridge_logging`] - Tracing subscriber setup

// Re-export core types
pub use busbridge_core::{
    BridgeConfig, BridgeError, BridgeResult, ConnectionState, FailureKind, LogLevel, ReplyFailure,
};

// Re-export transport types
pub use busbridge_transport::{
    CodecError, Envelope, EnvelopeType, FrameCodec, FrameReassembler, Headers, JsonFrameCodec,
};

// Re-export the client API
pub use busbridge_runtime::{
    BridgeClient, BridgeClientBuilder, BridgeMessage, Connector, HandlerId, TcpConnector,
};

// Re-export logging setup
pub use busbridge_logging::{ReloadHandle, init_logging, init_logging_from_env};

// Re-export common dependencies that client code needs
pub use async_trait::async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use busbridge::prelude::*;` to import commonly used types.
pub mod prelude {
    pub use crate::{
        BridgeClient, BridgeClientBuilder, BridgeConfig, BridgeError, BridgeMessage,
        BridgeResult, ConnectionState, Connector, HandlerId, Headers, LogLevel, async_trait,
    };

    pub use serde::{Deserialize, Serialize};
}
