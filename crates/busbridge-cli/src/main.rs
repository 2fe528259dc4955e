//! busbridge CLI - Talk to an event-bus bridge from the shell
//!
//! Commands:
//! - `busbridge send` - Send a point-to-point message
//! - `busbridge publish` - Publish to every subscriber of an address
//! - `busbridge request` - Send and print the reply
//! - `busbridge listen` - Print messages delivered to one or more addresses

use anyhow::Result;
use busbridge::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "busbridge")]
#[command(author, version, about = "Command-line client for event-bus bridges", long_about = None)]
struct Cli {
    /// Bridge host (overrides the config file)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Bridge port (overrides the config file)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Path to a TOML connection config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a point-to-point message
    Send {
        /// Destination address
        address: String,

        /// Message body (JSON, or taken as a string)
        body: String,

        /// Header as key=value (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Publish a message to every subscriber
    Publish {
        /// Destination address
        address: String,

        /// Message body (JSON, or taken as a string)
        body: String,

        /// Header as key=value (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Send a message and print the reply
    Request {
        /// Destination address
        address: String,

        /// Message body (JSON, or taken as a string)
        body: String,

        /// Header as key=value (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Give up after this many milliseconds
        #[arg(short, long, default_value_t = 10_000)]
        timeout_ms: u64,
    },

    /// Print messages delivered to the given addresses
    Listen {
        /// Addresses to register handlers on
        #[arg(required = true)]
        addresses: Vec<String>,

        /// Exit after this many messages
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level: LogLevel = cli.log_level.parse()?;
    busbridge::init_logging_from_env(level);

    let config = config::resolve(cli.config.as_deref(), cli.host, cli.port)?;

    match cli.command {
        Commands::Send {
            address,
            body,
            headers,
        } => {
            commands::send(config, &address, &body, &headers).await?;
        }
        Commands::Publish {
            address,
            body,
            headers,
        } => {
            commands::publish(config, &address, &body, &headers).await?;
        }
        Commands::Request {
            address,
            body,
            headers,
            timeout_ms,
        } => {
            commands::request(
                config,
                &address,
                &body,
                &headers,
                Duration::from_millis(timeout_ms),
            )
            .await?;
        }
        Commands::Listen { addresses, count } => {
            commands::listen(config, &addresses, count).await?;
        }
    }

    Ok(())
}
