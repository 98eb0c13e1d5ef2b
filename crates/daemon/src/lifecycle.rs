// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fs2::FileExt;
use rk_adapters::TracedFollowerAdapter;
use rk_core::RoleKind;
use rk_daemon::RemoteFollower;
use rk_engine::{Engine, EngineError, Follower, Leader, Node, ReplicationDriver};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;

/// Driver type the daemon runs on a leader
pub type DaemonDriver = ReplicationDriver<TracedFollowerAdapter<RemoteFollower>>;

/// What request handlers share across connections
pub struct ServerContext {
    pub name: String,
    pub node: Node,
    pub start_time: Instant,
    shutdown: watch::Sender<bool>,
}

impl ServerContext {
    pub fn new(name: impl Into<String>, node: Node) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            name: name.into(),
            node,
            start_time: Instant::now(),
            shutdown,
        }
    }

    /// Ask the daemon to stop
    pub fn request_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Receiver that flips to `true` once shutdown is requested
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub listener: TcpListener,
    pub context: Arc<ServerContext>,
    driver: Option<JoinHandle<()>>,
}

impl DaemonState {
    /// Start the replication driver task (leader only)
    pub fn start_driver(&mut self, driver: DaemonDriver) {
        let shutdown = self.context.shutdown_signal();
        let interval = self.config.replication_interval;
        self.driver = Some(tokio::spawn(driver.run(interval, shutdown)));
    }

    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        // 1. Stop the driver between rounds
        self.context.request_shutdown();
        if let Some(handle) = self.driver.take() {
            if tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .is_err()
            {
                warn!("Replication driver did not stop in time");
            }
        }

        // 2. Remove PID file; the lock itself is released when lock_file drops
        let lock_path = self.config.lock_path();
        if lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon, returning its state and, on a leader, the driver to run
pub async fn startup(
    config: &Config,
) -> Result<(DaemonState, Option<DaemonDriver>), LifecycleError> {
    match startup_inner(config).await {
        Ok(started) => Ok(started),
        Err(e) => {
            // A held lock means another daemon owns these files
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(
    config: &Config,
) -> Result<(DaemonState, Option<DaemonDriver>), LifecycleError> {
    // 1. Create data directory
    std::fs::create_dir_all(&config.data_dir)?;

    // 2. Acquire lock file FIRST - prevents two daemons sharing a WAL
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(config.lock_path())?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Open the engine; recovery replays the WAL before we accept traffic
    let (node, driver) = open_node(config)?;
    let progress = node.progress();
    info!(
        role = %config.role,
        last_applied = progress.last_applied,
        commit_index = progress.commit_index,
        keys = node.key_count(),
        "Loaded state"
    );

    // 4. Bind (LAST - only after recovery succeeds)
    let listener = TcpListener::bind(&config.listen)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.listen.clone(), e))?;

    info!("Daemon started: {} ({})", config.name, config.role);

    let state = DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        context: Arc::new(ServerContext::new(config.name.clone(), node)),
        driver: None,
    };
    Ok((state, driver))
}

fn open_node(config: &Config) -> Result<(Node, Option<DaemonDriver>), LifecycleError> {
    let wal_path = config.wal_path();
    match config.role {
        RoleKind::Leader => {
            let engine = Arc::new(Engine::open(
                &wal_path,
                Leader::new(config.followers.clone()),
            )?);
            let adapters = config
                .followers
                .iter()
                .map(|addr| TracedFollowerAdapter::new(RemoteFollower::new(addr)))
                .collect();
            let driver = ReplicationDriver::new(Arc::clone(&engine), adapters);
            Ok((Node::Leader(engine), Some(driver)))
        }
        RoleKind::Follower => {
            let engine = Engine::open(&wal_path, Follower::new(config.leader.clone()))?;
            Ok((Node::Follower(Arc::new(engine)), None))
        }
    }
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    let lock_path = config.lock_path();
    if lock_path.exists() {
        let _ = std::fs::remove_file(&lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
