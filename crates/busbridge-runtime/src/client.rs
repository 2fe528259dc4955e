//! Client handle and builder

use crate::connection::{Command, Connection, Shared};
use crate::connector::{Connector, TcpConnector};
use crate::handlers::{HandlerId, MessageHandler};
use crate::listeners::{EndHandler, ExceptionHandler, Listeners, ReadyHandler};
use crate::message::BridgeMessage;
use crate::replies::ReplyHandler;
use busbridge_core::{BridgeConfig, BridgeError, BridgeResult, ConnectionState};
use busbridge_transport::Headers;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Handle to a bridge connection
///
/// Handles are cheap to clone and all talk to the same connection worker.
/// Operations never block and never return gating errors directly: when the
/// connection is not open, or the address is empty, the error goes to the
/// exception handler and nothing is written. The worker stops once the
/// connection is closed or every handle has been dropped.
#[derive(Clone)]
pub struct BridgeClient {
    commands: mpsc::UnboundedSender<Command>,
    shared: Arc<Shared>,
}

impl BridgeClient {
    /// Start building a client; fails if the configuration is invalid
    pub fn builder(config: BridgeConfig) -> BridgeResult<BridgeClientBuilder> {
        config.validate()?;
        Ok(BridgeClientBuilder::new(config))
    }

    /// Connect over TCP with no listeners installed
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn connect(config: BridgeConfig) -> BridgeResult<Self> {
        Ok(Self::builder(config)?.connect())
    }

    pub(crate) fn from_parts(
        commands: mpsc::UnboundedSender<Command>,
        shared: Arc<Shared>,
    ) -> Self {
        Self { commands, shared }
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Wait until the connection attempt has finished
    ///
    /// Resolves `Ok` once open, or [`BridgeError::ConnectionClosed`] if the
    /// attempt failed or the connection was closed first.
    pub async fn ready(&self) -> BridgeResult<()> {
        let mut state = self.shared.subscribe();
        let settled = *state
            .wait_for(|s| *s != ConnectionState::Connecting)
            .await
            .map_err(|_| BridgeError::ConnectionClosed)?;
        match settled {
            ConnectionState::Open => Ok(()),
            _ => Err(BridgeError::ConnectionClosed),
        }
    }

    /// Wait until the connection reaches `Closed`
    pub async fn closed(&self) {
        let mut state = self.shared.subscribe();
        let _ = state.wait_for(|s| *s == ConnectionState::Closed).await;
    }

    pub fn send(&self, address: &str, body: Value) {
        self.send_with(address, body, None, None);
    }

    pub fn send_with_headers(&self, address: &str, body: Value, headers: Headers) {
        self.send_with(address, body, Some(headers), None);
    }

    /// Send and invoke `callback` with the single reply
    pub fn send_with_reply<F>(&self, address: &str, body: Value, callback: F)
    where
        F: FnOnce(BridgeMessage) + Send + 'static,
    {
        self.send_with(address, body, None, Some(Box::new(callback)));
    }

    /// Point-to-point send with optional headers and reply callback
    pub fn send_with(
        &self,
        address: &str,
        body: Value,
        headers: Option<Headers>,
        reply: Option<ReplyHandler>,
    ) {
        self.submit(
            address,
            Command::Send {
                address: address.to_string(),
                body,
                headers,
                reply,
            },
        );
    }

    /// Send and wait for the reply
    ///
    /// Unlike the callback forms, gating errors are returned directly. A
    /// failure reply becomes [`BridgeError::Remote`]; a connection that ends
    /// before the reply arrives yields [`BridgeError::ConnectionClosed`].
    pub async fn request(&self, address: &str, body: Value) -> BridgeResult<BridgeMessage> {
        self.request_with(address, body, None).await
    }

    pub async fn request_with_headers(
        &self,
        address: &str,
        body: Value,
        headers: Headers,
    ) -> BridgeResult<BridgeMessage> {
        self.request_with(address, body, Some(headers)).await
    }

    async fn request_with(
        &self,
        address: &str,
        body: Value,
        headers: Option<Headers>,
    ) -> BridgeResult<BridgeMessage> {
        let (tx, rx) = oneshot::channel::<BridgeMessage>();
        let reply: ReplyHandler = Box::new(move |message: BridgeMessage| {
            let _ = tx.send(message);
        });
        self.try_submit(
            address,
            Command::Send {
                address: address.to_string(),
                body,
                headers,
                reply: Some(reply),
            },
        )?;

        let message = rx.await.map_err(|_| BridgeError::ConnectionClosed)?;
        match message.cause() {
            Some(failure) => Err(BridgeError::Remote(failure)),
            None => Ok(message),
        }
    }

    pub fn publish(&self, address: &str, body: Value) {
        self.publish_with(address, body, None);
    }

    pub fn publish_with_headers(&self, address: &str, body: Value, headers: Headers) {
        self.publish_with(address, body, Some(headers));
    }

    fn publish_with(&self, address: &str, body: Value, headers: Option<Headers>) {
        self.submit(
            address,
            Command::Publish {
                address: address.to_string(),
                body,
                headers,
            },
        );
    }

    /// Add a handler for inbound messages on `address`
    ///
    /// Only the first handler for an address subscribes on the remote side.
    /// The returned id is what [`unregister_handler`](Self::unregister_handler)
    /// takes; if the registration was rejected, unregistering it is a no-op.
    pub fn register_handler<F>(&self, address: &str, handler: F) -> HandlerId
    where
        F: Fn(&BridgeMessage) + Send + Sync + 'static,
    {
        self.register_handler_with(address, None, Arc::new(handler))
    }

    pub fn register_handler_with_headers<F>(
        &self,
        address: &str,
        headers: Headers,
        handler: F,
    ) -> HandlerId
    where
        F: Fn(&BridgeMessage) + Send + Sync + 'static,
    {
        self.register_handler_with(address, Some(headers), Arc::new(handler))
    }

    fn register_handler_with(
        &self,
        address: &str,
        headers: Option<Headers>,
        handler: MessageHandler,
    ) -> HandlerId {
        let id = self.shared.next_handler_id();
        self.submit(
            address,
            Command::Register {
                address: address.to_string(),
                headers,
                id,
                handler,
            },
        );
        id
    }

    /// Remove a handler; the last removal for an address unsubscribes
    pub fn unregister_handler(&self, address: &str, id: HandlerId) {
        self.unregister_handler_with(address, None, id);
    }

    pub fn unregister_handler_with_headers(&self, address: &str, headers: Headers, id: HandlerId) {
        self.unregister_handler_with(address, Some(headers), id);
    }

    fn unregister_handler_with(&self, address: &str, headers: Option<Headers>, id: HandlerId) {
        self.submit(
            address,
            Command::Unregister {
                address: address.to_string(),
                headers,
                id,
            },
        );
    }

    /// Close the connection after every previously submitted write
    ///
    /// Never gated; closing an already closed client does nothing.
    pub fn close(&self) {
        if self.commands.send(Command::Close).is_err() {
            debug!("Close requested after the connection worker stopped");
        }
    }

    pub fn set_exception_handler<F>(&self, handler: F)
    where
        F: Fn(BridgeError) + Send + Sync + 'static,
    {
        self.shared.listeners.set_exception(Some(Arc::new(handler)));
    }

    pub fn set_end_handler<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.listeners.set_end(Some(Arc::new(handler)));
    }

    fn submit(&self, address: &str, command: Command) {
        if let Err(err) = self.try_submit(address, command) {
            debug!(address, error = %err, "Operation rejected");
            self.shared.listeners.exception(err);
        }
    }

    /// Gate on state first, then on the address
    fn try_submit(&self, address: &str, command: Command) -> BridgeResult<()> {
        let state = self.state();
        if !state.can_send() {
            return Err(BridgeError::invalid_state(ConnectionState::Open, state));
        }
        if address.is_empty() {
            return Err(BridgeError::NullAddress);
        }
        self.commands
            .send(command)
            .map_err(|_| BridgeError::invalid_state(ConnectionState::Open, self.state()))
    }
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("state", &self.state())
            .finish()
    }
}

/// Configures listeners before the connection starts
pub struct BridgeClientBuilder {
    config: BridgeConfig,
    exception_handler: Option<ExceptionHandler>,
    end_handler: Option<EndHandler>,
    ready_handler: Option<ReadyHandler>,
}

impl BridgeClientBuilder {
    fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            exception_handler: None,
            end_handler: None,
            ready_handler: None,
        }
    }

    pub fn exception_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(BridgeError) + Send + Sync + 'static,
    {
        self.exception_handler = Some(Arc::new(handler));
        self
    }

    pub fn end_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.end_handler = Some(Arc::new(handler));
        self
    }

    /// Invoked once, when the connection first opens
    pub fn ready_handler<F>(mut self, handler: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.ready_handler = Some(Box::new(handler));
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Spawn the connection worker over TCP
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn connect(self) -> BridgeClient {
        self.connect_with(TcpConnector::new())
    }

    /// Spawn the connection worker over a custom transport
    ///
    /// The returned client is already in `Connecting`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn connect_with<C: Connector>(self, connector: C) -> BridgeClient {
        let listeners = Listeners::new(
            self.exception_handler,
            self.end_handler,
            self.ready_handler,
        );
        let shared = Arc::new(Shared::new(listeners));
        shared.transition(ConnectionState::Connecting);

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let connection = Connection::new(
            self.config,
            shared.clone(),
            commands_rx,
            commands_tx.downgrade(),
        );
        tokio::spawn(connection.run(connector));

        BridgeClient::from_parts(commands_tx, shared)
    }
}
