//! busbridge-runtime - Connection worker and client API
//!
//! This crate provides:
//! - [`BridgeClient`] and [`BridgeClientBuilder`], the public handle
//! - [`Connector`] and [`TcpConnector`] for establishing the transport
//! - [`HandlerRegistry`] and [`ReplyRegistry`] for inbound routing
//! - [`Keepalive`] for the periodic ping
//!
//! Every client is backed by one tokio task that owns the socket. Handles
//! only enqueue commands, so every public operation is non-blocking.

mod client;
mod connection;
mod connector;
mod handlers;
mod keepalive;
mod listeners;
mod message;
mod panic_guard;
mod replies;

pub use client::{BridgeClient, BridgeClientBuilder};
pub use connector::{Connector, TcpConnector};
pub use handlers::{Dispatch, HandlerId, HandlerRegistry, MessageHandler};
pub use keepalive::Keepalive;
pub use listeners::{EndHandler, ExceptionHandler, ReadyHandler};
pub use message::BridgeMessage;
pub use replies::{ReplyHandler, ReplyRegistry};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{BridgeClient, BridgeClientBuilder, BridgeMessage, Connector, HandlerId};
}
