// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rk - relaykv command line client

mod client;
mod commands;
mod completions;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{kv, node};
use tracing_subscriber::EnvFilter;

use crate::client::{resolve_node, ClientError, NodeClient};
use crate::completions::CompletionsArgs;
use crate::error::RkError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "rk",
    version,
    about = "relaykv - replicated key-value store client"
)]
struct Cli {
    /// Node address (defaults to RK_NODE, then 127.0.0.1:7400)
    #[arg(long, global = true)]
    node: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a key
    Get { key: String },
    /// Write a key (redirected to the leader when sent to a follower)
    Put { key: String, value: String },
    /// Delete a key
    Delete { key: String },
    /// Show last applied and commit indexes
    Progress,
    /// Show node status
    Status,
    /// Dump the leader's replication log from an index
    Delta {
        /// First index to include; negative values start at 0
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        from: i64,
    },
    /// Check that the node answers
    Ping,
    /// Ask the node to shut down
    Shutdown,
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Completions never touch the network
    if let Commands::Completions(args) = cli.command {
        completions::write_completions::<Cli>(args.shell, &mut std::io::stdout());
        return Ok(());
    }

    let client = NodeClient::new(resolve_node(cli.node));
    if let Err(e) = dispatch(&client, cli.command, cli.output).await {
        eprint!("{}", RkError::from(&e));
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch(
    client: &NodeClient,
    command: Commands,
    format: OutputFormat,
) -> Result<(), ClientError> {
    match command {
        Commands::Get { key } => kv::get(client, key, format).await,
        Commands::Put { key, value } => kv::put(client, key, value, format).await,
        Commands::Delete { key } => kv::delete(client, key, format).await,
        Commands::Progress => node::progress(client, format).await,
        Commands::Status => node::status(client, format).await,
        Commands::Delta { from } => node::delta(client, from, format).await,
        Commands::Ping => node::ping(client, format).await,
        Commands::Shutdown => node::shutdown(client).await,
        // Handled before connecting
        Commands::Completions(_) => Ok(()),
    }
}
