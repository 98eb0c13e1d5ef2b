//! Daemon lifecycle specs
//!
//! Verify rkd start, status, and shutdown.

use crate::prelude::*;

#[test]
fn rkd_creates_pid_and_log_files() {
    let node = NodeProcess::leader("n1", &[]);
    let data_dir = node.data_dir();

    assert!(data_dir.join("rkd.pid").exists(), "rkd.pid should exist");
    let logged = wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_to_string(data_dir.join("rkd.log"))
            .map(|log| log.contains("--- rkd: starting (pid: "))
            .unwrap_or(false)
    });
    assert!(logged, "rkd.log should carry the startup marker");
}

#[test]
fn status_reports_name_and_role() {
    let node = NodeProcess::leader("n1", &[]);
    node.rk()
        .args(&["status"])
        .passes()
        .stdout_has("Node: n1 (leader)")
        .stdout_has("Keys: 0");
}

#[test]
fn ping_reports_version() {
    let node = NodeProcess::follower("f1", None);
    node.rk()
        .args(&["ping"])
        .passes()
        .stdout_has("pong from")
        .stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn shutdown_stops_daemon_and_removes_pid_file() {
    let node = NodeProcess::leader("n1", &[]);
    let addr = node.addr().to_string();
    let dir = node.stop();

    assert!(!dir.path().join("data/rkd.pid").exists());
    rk().args(&["--node", &addr, "ping"]).fails();
}

#[test]
fn second_daemon_on_same_data_dir_fails() {
    let node = NodeProcess::leader("n1", &[]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rk.toml");
    std::fs::write(
        &path,
        format!(
            "name = \"n2\"\nrole = \"leader\"\nlisten = \"127.0.0.1:0\"\ndata_dir = {:?}\n",
            node.data_dir().display().to_string()
        ),
    )
    .unwrap();

    rkd().args(&[path.to_str().unwrap()])
        .fails()
        .stderr_has("LockFailed");
    // The running daemon keeps its pid file
    assert!(node.data_dir().join("rkd.pid").exists());
}

#[test]
fn writes_survive_restart() {
    let follower = NodeProcess::follower("f1", None);
    let leader = NodeProcess::leader("l1", &[follower.addr()]);
    leader.rk().args(&["put", "a", "1"]).passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || get(&follower, "a") == "1"));

    let addr = follower.addr().to_string();
    let dir = follower.stop();
    let follower = NodeProcess::restart_follower(dir, "f1", &addr);

    assert_eq!(get(&follower, "a"), "1");
    follower
        .rk()
        .args(&["progress"])
        .passes()
        .stdout_has("last_applied=1 commit_index=1");
}

#[test]
fn corrupt_wal_is_quarantined_on_start() {
    let follower = NodeProcess::follower("f1", None);
    let addr = follower.addr().to_string();
    let dir = follower.stop();
    std::fs::write(dir.path().join("data/rk.wal"), "not a wal\n").unwrap();

    let follower = NodeProcess::restart_follower(dir, "f1", &addr);
    assert!(has_quarantine(&follower.data_dir()));
    assert_eq!(get(&follower, "a"), "(not found)");
}
