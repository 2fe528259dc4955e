//! Establishing the byte-stream transport

use async_trait::async_trait;
use busbridge_core::BridgeConfig;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Opens the duplex byte stream a client runs over
///
/// [`TcpConnector`] is the production implementation; tests plug in
/// in-memory streams.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    async fn connect(&self, config: &BridgeConfig) -> io::Result<Self::Stream>;
}

/// Plain TCP connector honoring the connect timeout and retry settings
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    pub fn new() -> Self {
        Self
    }

    async fn attempt(config: &BridgeConfig) -> io::Result<TcpStream> {
        let address = config.address();
        let connect = TcpStream::connect(address.as_str());
        let stream = match config.connection_timeout() {
            Some(limit) => tokio::time::timeout(limit, connect).await.map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {address} timed out after {}ms", limit.as_millis()),
                )
            })??,
            None => connect.await?,
        };
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, config: &BridgeConfig) -> io::Result<TcpStream> {
        let retries = config.reconnect_attempts.unwrap_or(0);
        let mut attempt = 0u32;
        loop {
            match Self::attempt(config).await {
                Ok(stream) => {
                    debug!(address = %config.address(), attempt, "TCP connection established");
                    return Ok(stream);
                }
                Err(err) if attempt < retries => {
                    attempt += 1;
                    warn!(
                        address = %config.address(),
                        error = %err,
                        "Connect failed, retrying ({}/{})",
                        attempt,
                        retries
                    );
                    tokio::time::sleep(config.reconnect_interval()).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
