//! Command implementations

use anyhow::{Context, Result};
use busbridge::{BridgeClient, BridgeConfig, BridgeMessage, Headers};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Parse a message body: JSON when it parses, otherwise a plain string
pub fn parse_body(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parse `key=value` header arguments; values follow the same rule as bodies
pub fn parse_headers(raw: &[String]) -> Result<Option<Headers>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let mut headers = Headers::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("Header must be key=value, got '{entry}'"))?;
        if key.is_empty() {
            anyhow::bail!("Header name cannot be empty in '{entry}'");
        }
        headers.insert(key.to_string(), parse_body(value));
    }
    Ok(Some(headers))
}

async fn connect(config: BridgeConfig) -> Result<BridgeClient> {
    let address = config.address();
    let client = BridgeClient::builder(config)?
        .exception_handler(|err| error!(error = %err, "Bridge error"))
        .end_handler(|| info!("Bridge server closed the connection"))
        .connect();
    client
        .ready()
        .await
        .with_context(|| format!("Failed to connect to bridge at {address}"))?;
    info!(address = %address, "Connected");
    Ok(client)
}

async fn shutdown(client: &BridgeClient) {
    client.close();
    client.closed().await;
}

fn print_message(message: &BridgeMessage) -> Result<()> {
    println!("{}", serde_json::to_string(message.envelope())?);
    Ok(())
}

pub async fn send(
    config: BridgeConfig,
    address: &str,
    body: &str,
    headers: &[String],
) -> Result<()> {
    let headers = parse_headers(headers)?;
    let client = connect(config).await?;
    client.send_with(address, parse_body(body), headers, None);
    shutdown(&client).await;
    Ok(())
}

pub async fn publish(
    config: BridgeConfig,
    address: &str,
    body: &str,
    headers: &[String],
) -> Result<()> {
    let headers = parse_headers(headers)?;
    let client = connect(config).await?;
    match headers {
        Some(headers) => client.publish_with_headers(address, parse_body(body), headers),
        None => client.publish(address, parse_body(body)),
    }
    shutdown(&client).await;
    Ok(())
}

pub async fn request(
    config: BridgeConfig,
    address: &str,
    body: &str,
    headers: &[String],
    timeout: Duration,
) -> Result<()> {
    let headers = parse_headers(headers)?.unwrap_or_default();
    let client = connect(config).await?;

    let reply = tokio::time::timeout(
        timeout,
        client.request_with_headers(address, parse_body(body), headers),
    )
    .await;
    shutdown(&client).await;

    let reply = reply
        .with_context(|| format!("No reply from '{address}' within {}ms", timeout.as_millis()))?
        .with_context(|| format!("Request to '{address}' failed"))?;
    print_message(&reply)
}

/// Print every message delivered to `addresses` until `count` messages were
/// seen, the server closes the connection, or Ctrl-C
pub async fn listen(
    config: BridgeConfig,
    addresses: &[String],
    count: Option<usize>,
) -> Result<()> {
    let client = connect(config).await?;
    let (tx, mut rx) = mpsc::unbounded_channel::<BridgeMessage>();

    for address in addresses {
        let tx = tx.clone();
        client.register_handler(address, move |message: &BridgeMessage| {
            let _ = tx.send(message.clone());
        });
        info!(address = %address, "Listening");
    }
    drop(tx);

    let mut received = 0usize;
    loop {
        tokio::select! {
            Some(message) = rx.recv() => {
                print_message(&message)?;
                received += 1;
                if count.is_some_and(|limit| received >= limit) {
                    break;
                }
            }
            _ = client.closed() => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    shutdown(&client).await;
    Ok(())
}
