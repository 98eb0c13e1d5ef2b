// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;
use tempfile::tempdir;

fn config(dir: &Path, role: RoleKind) -> Config {
    Config {
        name: "node".to_string(),
        role,
        listen: "127.0.0.1:0".to_string(),
        data_dir: dir.join("data"),
        followers: Vec::new(),
        leader: None,
        replication_interval: Duration::from_millis(20),
    }
}

#[tokio::test]
async fn startup_creates_data_dir_and_pid_file() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), RoleKind::Follower);

    let (mut daemon, driver) = startup(&config).await.unwrap();
    assert!(driver.is_none());
    assert!(config.wal_path().exists());

    let pid = std::fs::read_to_string(config.lock_path()).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());

    daemon.shutdown().await.unwrap();
    assert!(!config.lock_path().exists());
}

#[tokio::test]
async fn second_daemon_on_same_data_dir_fails() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), RoleKind::Follower);

    let (mut first, _) = startup(&config).await.unwrap();
    let second = startup(&config).await;
    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));

    // The running daemon keeps its pid file
    assert!(config.lock_path().exists());
    first.shutdown().await.unwrap();
}

#[tokio::test]
async fn leader_startup_builds_driver() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path(), RoleKind::Leader);
    config.followers = vec!["127.0.0.1:1".to_string()];

    let (mut daemon, driver) = startup(&config).await.unwrap();
    let driver = driver.unwrap();
    assert_eq!(driver.cursors(), vec![("127.0.0.1:1".to_string(), 0)]);
    assert_eq!(daemon.context.node.role(), RoleKind::Leader);

    daemon.start_driver(driver);
    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn restart_recovers_state() {
    let dir = tempdir().unwrap();
    let config = config(dir.path(), RoleKind::Leader);

    let (mut daemon, _) = startup(&config).await.unwrap();
    daemon
        .context
        .node
        .put("k".to_string(), "v".to_string())
        .unwrap();
    daemon.shutdown().await.unwrap();
    drop(daemon);

    let (mut daemon, _) = startup(&config).await.unwrap();
    assert_eq!(daemon.context.node.get("k").as_deref(), Some("v"));
    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn bind_failure_releases_pid_file() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path(), RoleKind::Follower);
    config.listen = "not-an-address".to_string();

    assert!(matches!(
        startup(&config).await,
        Err(LifecycleError::BindFailed(_, _))
    ));
    assert!(!config.lock_path().exists());
}

#[test]
fn shutdown_signal_flips_once_requested() {
    let dir = tempdir().unwrap();
    let engine = Engine::open(&dir.path().join("f.wal"), Follower::default()).unwrap();
    let context = ServerContext::new("f", Node::Follower(Arc::new(engine)));

    let signal = context.shutdown_signal();
    assert!(!*signal.borrow());
    context.request_shutdown();
    assert!(*signal.borrow());
}
