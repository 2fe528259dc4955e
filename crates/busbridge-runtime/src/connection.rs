//! Connection worker
//!
//! One tokio task per client owns the transport, both registries, the frame
//! reassembler and the keepalive. Public operations reach it as [`Command`]s
//! over an unbounded channel; state changes are published through a
//! `watch` channel so handles can read the current state without a lock.
//!
//! ```text
//!  BridgeClient ──Command──► Connection::run
//!       ▲                      ├─ connect (Connector)
//!       │ watch<State>         ├─ select! { command | read chunk | ping tick }
//!       └──────────────────────┴─ finish (drain, clear replies)
//! ```

use crate::connector::Connector;
use crate::handlers::{Dispatch, HandlerId, HandlerRegistry, MessageHandler};
use crate::keepalive::Keepalive;
use crate::listeners::Listeners;
use crate::message::{BridgeMessage, Replier};
use crate::replies::{ReplyHandler, ReplyRegistry};
use busbridge_core::{BridgeConfig, BridgeError, ConnectionState};
use busbridge_transport::{
    Envelope, FrameCodec, FrameReassembler, Headers, JsonFrameCodec, merge_headers,
};
use bytes::Bytes;
use serde_json::Value;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Operations submitted by client handles
pub(crate) enum Command {
    Send {
        address: String,
        body: Value,
        headers: Option<Headers>,
        reply: Option<ReplyHandler>,
    },
    Publish {
        address: String,
        body: Value,
        headers: Option<Headers>,
    },
    Register {
        address: String,
        headers: Option<Headers>,
        id: HandlerId,
        handler: MessageHandler,
    },
    Unregister {
        address: String,
        headers: Option<Headers>,
        id: HandlerId,
    },
    Close,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Send { .. } => "send",
            Command::Publish { .. } => "publish",
            Command::Register { .. } => "register",
            Command::Unregister { .. } => "unregister",
            Command::Close => "close",
        }
    }
}

/// State shared between the worker and every client handle
pub(crate) struct Shared {
    state: watch::Sender<ConnectionState>,
    pub(crate) listeners: Listeners,
    next_handler_id: AtomicU64,
}

impl Shared {
    pub(crate) fn new(listeners: Listeners) -> Self {
        Self {
            state: watch::Sender::new(ConnectionState::Closed),
            listeners,
            next_handler_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub(crate) fn next_handler_id(&self) -> HandlerId {
        HandlerId(self.next_handler_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn transition(&self, target: ConnectionState) {
        let current = self.state();
        if current == target {
            return;
        }
        if !current.can_transition_to(target) {
            warn!(from = %current, to = %target, "Unexpected connection state transition");
        }
        self.state.send_replace(target);
        debug!(from = %current, to = %target, "Connection state changed");
    }
}

/// Inbound frame routing: handlers first, then pending replies, then the
/// exception channel for failures nobody waits for
struct Router {
    codec: JsonFrameCodec,
    handlers: HandlerRegistry,
    replies: ReplyRegistry,
    shared: Arc<Shared>,
    commands: mpsc::WeakUnboundedSender<Command>,
}

impl Router {
    fn route(&mut self, payload: &[u8]) {
        let envelope = match self.codec.decode(payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error = %err, len = payload.len(), "Discarding undecodable frame");
                self.shared.listeners.exception(err.into());
                return;
            }
        };
        trace!(kind = %envelope.kind(), address = ?envelope.address(), "Frame received");

        let address = envelope.address().map(str::to_owned);
        let failure = envelope.failure_details();

        if let Some(address) = address.as_deref() {
            if self.handlers.contains(address) {
                let message = self.message(envelope);
                let outcome = self.handlers.dispatch(address, &message);
                if let Dispatch::Delivered { panicked, .. } = outcome {
                    for err in panicked {
                        self.shared.listeners.exception(err);
                    }
                }
                return;
            }

            if self.replies.contains(address) {
                let message = self.message(envelope);
                if let Err(err) = self.replies.resolve(address, message) {
                    self.shared.listeners.exception(err);
                }
                return;
            }
        }

        match failure {
            Some(failure) => self.shared.listeners.exception(BridgeError::Remote(failure)),
            None => debug!(
                address = ?address,
                kind = %envelope.kind(),
                "Dropping unroutable frame"
            ),
        }
    }

    fn message(&self, envelope: Envelope) -> BridgeMessage {
        let replier = Replier::new(self.commands.clone(), self.shared.clone());
        BridgeMessage::new(envelope, Some(replier))
    }
}

/// What the open loop does after a command
enum Flow {
    Continue,
    Close,
}

pub(crate) struct Connection {
    config: BridgeConfig,
    shared: Arc<Shared>,
    commands: mpsc::UnboundedReceiver<Command>,
    router: Router,
    reassembler: FrameReassembler,
    keepalive: Keepalive,
}

impl Connection {
    pub(crate) fn new(
        config: BridgeConfig,
        shared: Arc<Shared>,
        commands: mpsc::UnboundedReceiver<Command>,
        client_commands: mpsc::WeakUnboundedSender<Command>,
    ) -> Self {
        Self {
            config,
            router: Router {
                codec: JsonFrameCodec::new(),
                handlers: HandlerRegistry::new(),
                replies: ReplyRegistry::new(),
                shared: shared.clone(),
                commands: client_commands,
            },
            shared,
            commands,
            reassembler: FrameReassembler::new(),
            keepalive: Keepalive::new(),
        }
    }

    /// Drive the connection from connect to close
    pub(crate) async fn run<C: Connector>(mut self, connector: C) {
        info!(address = %self.config.address(), "Connecting to bridge");

        if let Some(stream) = self.connect(&connector).await {
            self.run_open(stream).await;
        }

        self.finish();
        debug!(address = %self.config.address(), "Connection worker stopped");
    }

    /// Wait for the connector while still answering commands
    async fn connect<C: Connector>(&mut self, connector: &C) -> Option<C::Stream> {
        let config = self.config.clone();
        let connect = connector.connect(&config);
        tokio::pin!(connect);

        loop {
            tokio::select! {
                result = &mut connect => {
                    return match result {
                        Ok(stream) => Some(stream),
                        Err(err) => {
                            warn!(address = %config.address(), error = %err, "Connect failed");
                            self.shared.transition(ConnectionState::Closed);
                            self.shared.listeners.exception(BridgeError::Transport(err));
                            None
                        }
                    };
                }
                command = self.commands.recv() => match command {
                    Some(Command::Close) => {
                        debug!("Close requested while connecting");
                        self.shared.transition(ConnectionState::Closing);
                        self.shared.transition(ConnectionState::Closed);
                        return None;
                    }
                    Some(command) => self.reject(command),
                    None => {
                        debug!("All client handles dropped while connecting");
                        self.shared.transition(ConnectionState::Closed);
                        return None;
                    }
                },
            }
        }
    }

    async fn run_open<S>(&mut self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut reader, mut writer) = tokio::io::split(stream);

        self.shared.transition(ConnectionState::Open);
        info!(address = %self.config.address(), "Bridge connection open");

        if let Err(err) = self.write(&mut writer, &Envelope::ping()).await {
            self.fail(err);
            return;
        }
        self.keepalive.start(self.config.ping_interval());
        self.shared.listeners.ready();

        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("All client handles dropped, closing");
                        self.close(&mut writer).await;
                        return;
                    };
                    match self.handle_command(command, &mut writer).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Close) => {
                            self.close(&mut writer).await;
                            return;
                        }
                        Err(err) => {
                            self.fail(err);
                            return;
                        }
                    }
                }
                read = reader.read(&mut buf) => match read {
                    Ok(0) => {
                        self.end_of_stream();
                        return;
                    }
                    Ok(n) => {
                        for payload in self.reassembler.feed(&buf[..n]) {
                            self.router.route(&payload);
                        }
                    }
                    Err(err) => {
                        self.fail(err);
                        return;
                    }
                },
                _ = self.keepalive.tick() => {
                    trace!("Sending keepalive ping");
                    if let Err(err) = self.write(&mut writer, &Envelope::ping()).await {
                        self.fail(err);
                        return;
                    }
                }
            }
        }
    }

    async fn handle_command<W>(&mut self, command: Command, writer: &mut W) -> io::Result<Flow>
    where
        W: AsyncWrite + Unpin,
    {
        match command {
            Command::Send {
                address,
                body,
                headers,
                reply,
            } => {
                let mut envelope =
                    Envelope::send(address, body).with_headers(self.headers(headers));
                let reply_address = reply.map(|handler| self.router.replies.register(handler));
                if let Some(reply_address) = &reply_address {
                    envelope = envelope.with_reply_address(reply_address.as_str());
                }
                let Some(frame) = self.encode(&envelope) else {
                    if let Some(reply_address) = reply_address {
                        self.router.replies.remove(&reply_address);
                    }
                    return Ok(Flow::Continue);
                };
                Self::write_frame(writer, &envelope, frame).await?;
            }
            Command::Publish {
                address,
                body,
                headers,
            } => {
                let envelope = Envelope::publish(address, body).with_headers(self.headers(headers));
                self.write(writer, &envelope).await?;
            }
            Command::Register {
                address,
                headers,
                id,
                handler,
            } => {
                if self.router.handlers.add(&address, id, handler) {
                    debug!(address = %address, "First handler registered, subscribing");
                    let envelope = Envelope::register(address).with_headers(self.headers(headers));
                    self.write(writer, &envelope).await?;
                }
            }
            Command::Unregister {
                address,
                headers,
                id,
            } => {
                if self.router.handlers.remove(&address, id) {
                    debug!(address = %address, "Last handler removed, unsubscribing");
                    let envelope =
                        Envelope::unregister(address).with_headers(self.headers(headers));
                    self.write(writer, &envelope).await?;
                }
            }
            Command::Close => return Ok(Flow::Close),
        }
        Ok(Flow::Continue)
    }

    fn headers(&self, headers: Option<Headers>) -> Headers {
        merge_headers(&self.config.default_headers, headers.as_ref())
    }

    /// Encode a frame, reporting encode failures to the exception channel
    fn encode(&self, envelope: &Envelope) -> Option<Bytes> {
        match self.router.codec.encode(envelope) {
            Ok(frame) => Some(frame),
            Err(err) => {
                warn!(kind = %envelope.kind(), error = %err, "Failed to encode outbound frame");
                self.shared.listeners.exception(err.into());
                None
            }
        }
    }

    /// Write one frame; only transport errors are returned
    ///
    /// Takes `&mut self`: the reply registry is `!Sync`, so a shared borrow
    /// held across the write would make the worker future `!Send`.
    async fn write<W>(&mut self, writer: &mut W, envelope: &Envelope) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        match self.encode(envelope) {
            Some(frame) => Self::write_frame(writer, envelope, frame).await,
            None => Ok(()),
        }
    }

    async fn write_frame<W>(writer: &mut W, envelope: &Envelope, frame: Bytes) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&frame).await?;
        trace!(kind = %envelope.kind(), len = frame.len(), "Frame written");
        Ok(())
    }

    async fn close<W>(&mut self, writer: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        self.shared.transition(ConnectionState::Closing);
        self.keepalive.cancel();
        if let Err(err) = writer.shutdown().await {
            debug!(error = %err, "Transport shutdown failed during close");
        }
        self.shared.transition(ConnectionState::Closed);
        info!(address = %self.config.address(), "Bridge connection closed");
    }

    fn end_of_stream(&mut self) {
        self.keepalive.cancel();
        if !self.reassembler.is_empty() {
            debug!(
                buffered = self.reassembler.buffered_len(),
                "Peer closed mid-frame, discarding partial frame"
            );
        }
        self.shared.transition(ConnectionState::Closed);
        info!(address = %self.config.address(), "Bridge closed by peer");
        self.shared.listeners.end();
    }

    fn fail(&mut self, err: io::Error) {
        self.keepalive.cancel();
        self.shared.transition(ConnectionState::Closed);
        warn!(address = %self.config.address(), error = %err, "Bridge transport failed");
        self.shared.listeners.exception(BridgeError::Transport(err));
    }

    /// Report a command that arrived while the connection could not take it
    fn reject(&self, command: Command) {
        if matches!(command, Command::Close) {
            return;
        }
        let state = self.shared.state();
        debug!(command = command.name(), state = %state, "Rejecting command");
        self.shared
            .listeners
            .exception(BridgeError::invalid_state(ConnectionState::Open, state));
    }

    fn finish(&mut self) {
        self.commands.close();
        while let Ok(command) = self.commands.try_recv() {
            self.reject(command);
        }
        let dropped = self.router.replies.clear();
        if dropped > 0 {
            debug!(dropped, "Discarded pending reply callbacks");
        }
        self.reassembler.clear();
    }
}
