// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! relaykv node daemon (rkd)
//!
//! Serves one leader or follower node over TCP.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod lifecycle;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::config::Config;
use crate::lifecycle::LifecycleError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let Some(config_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: rkd <config.toml>");
        std::process::exit(2);
    };

    // Load configuration
    let config = Config::load(&config_path)?;

    // Write startup marker to log (before tracing setup, so it is never lost)
    write_startup_marker(&config)?;

    // Set up logging
    let log_guard = setup_logging(&config)?;

    info!(
        "Starting rkd {} as {} from {}",
        config.name,
        config.role,
        config_path.display()
    );

    // Start daemon
    let (mut daemon, driver) = match lifecycle::startup(&config).await {
        Ok(started) => started,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };
    if let Some(driver) = driver {
        daemon.start_driver(driver);
    }

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut shutdown = daemon.context.shutdown_signal();

    let addr = daemon.listener.local_addr()?;
    info!("Daemon ready, listening on {}", addr);

    // Signal ready for parent process; port 0 configs learn their port here
    println!("READY {}", addr);

    loop {
        tokio::select! {
            result = daemon.listener.accept() => {
                match result {
                    Ok((stream, peer)) => {
                        let context = Arc::clone(&daemon.context);
                        tokio::spawn(async move {
                            if let Err(e) = server::handle_connection(&context, stream).await {
                                error!("Error handling connection from {}: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                }
            }

            _ = shutdown.changed() => {
                info!("Shutdown requested via IPC, shutting down...");
                break;
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    daemon.shutdown().await?;
    info!("Daemon stopped");
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- rkd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- rkd: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    std::fs::create_dir_all(&config.data_dir)?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(&config.data_dir, "rkd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
