//! Inbound messages handed to handlers and reply callbacks

use crate::client::BridgeClient;
use crate::connection::{Command, Shared};
use crate::replies::ReplyHandler;
use busbridge_core::{BridgeError, BridgeResult, ReplyFailure};
use busbridge_transport::{Envelope, Headers};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Weak route back to the connection a message arrived on
///
/// Holding a message never keeps the connection worker alive.
#[derive(Clone)]
pub(crate) struct Replier {
    commands: mpsc::WeakUnboundedSender<Command>,
    shared: Arc<Shared>,
}

impl Replier {
    pub(crate) fn new(commands: mpsc::WeakUnboundedSender<Command>, shared: Arc<Shared>) -> Self {
        Self { commands, shared }
    }

    /// A client handle, if any other handle still keeps the worker running
    fn client(&self) -> Option<BridgeClient> {
        self.commands
            .upgrade()
            .map(|commands| BridgeClient::from_parts(commands, self.shared.clone()))
    }
}

/// A decoded inbound envelope plus the ability to answer it
///
/// Cloning is cheap; the envelope is shared.
#[derive(Clone)]
pub struct BridgeMessage {
    envelope: Arc<Envelope>,
    replier: Option<Replier>,
}

impl BridgeMessage {
    pub(crate) fn new(envelope: Envelope, replier: Option<Replier>) -> Self {
        Self {
            envelope: Arc::new(envelope),
            replier,
        }
    }

    /// Wrap an envelope that is not attached to any connection
    ///
    /// Replies on a detached message fail with [`BridgeError::ConnectionClosed`].
    pub fn detached(envelope: Envelope) -> Self {
        Self::new(envelope, None)
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn body(&self) -> Option<&Value> {
        self.envelope.body.as_ref()
    }

    /// Deserialize the body into a typed value
    pub fn body_as<T: DeserializeOwned>(&self) -> BridgeResult<T> {
        let body = self.envelope.body.clone().unwrap_or(Value::Null);
        Ok(serde_json::from_value(body)?)
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.envelope.headers.as_ref()
    }

    pub fn address(&self) -> Option<&str> {
        self.envelope.address()
    }

    pub fn reply_address(&self) -> Option<&str> {
        self.envelope.reply_address()
    }

    pub fn succeeded(&self) -> bool {
        !self.envelope.is_failure()
    }

    pub fn failed(&self) -> bool {
        self.envelope.is_failure()
    }

    /// Failure details, present only for `err` envelopes
    pub fn cause(&self) -> Option<ReplyFailure> {
        self.envelope.failure_details()
    }

    /// Send `body` to this message's reply address
    pub fn reply(&self, body: Value) -> BridgeResult<()> {
        self.reply_with(body, None, None)
    }

    pub fn reply_with_headers(&self, body: Value, headers: Headers) -> BridgeResult<()> {
        self.reply_with(body, Some(headers), None)
    }

    /// Reply and expect an answer to the reply
    pub fn reply_with_callback<F>(&self, body: Value, callback: F) -> BridgeResult<()>
    where
        F: FnOnce(BridgeMessage) + Send + 'static,
    {
        self.reply_with(body, None, Some(Box::new(callback)))
    }

    /// Reply with optional headers and an optional callback for the answer
    ///
    /// Fails without writing anything when the message carries no reply
    /// address, and with [`BridgeError::ConnectionClosed`] once every client
    /// handle is gone. Gating errors on the connection are reported to the
    /// exception handler, as for [`BridgeClient::send`].
    pub fn reply_with(
        &self,
        body: Value,
        headers: Option<Headers>,
        callback: Option<ReplyHandler>,
    ) -> BridgeResult<()> {
        let reply_address = self.reply_address().ok_or(BridgeError::NoReplyAddress)?;
        let client = self
            .replier
            .as_ref()
            .and_then(Replier::client)
            .ok_or(BridgeError::ConnectionClosed)?;
        client.send_with(reply_address, body, headers, callback);
        Ok(())
    }
}

impl std::fmt::Debug for BridgeMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeMessage")
            .field("envelope", &self.envelope)
            .field("attached", &self.replier.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "message/message_tests.rs"]
mod message_tests;
