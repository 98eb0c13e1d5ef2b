//! CLI error specs
//!
//! Verify error reporting and exit codes.

use crate::prelude::*;

/// An address nothing listens on
fn dead_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

#[test]
fn unreachable_node_fails_with_suggestions() {
    let addr = dead_addr();
    rk().args(&["--node", &addr, "get", "x"])
        .fails()
        .stderr_has(&format!("Could not reach node at {}", addr))
        .stderr_has("suggestions:");
}

#[test]
fn rk_node_env_selects_node() {
    let addr = dead_addr();
    rk().args(&["ping"])
        .env("RK_NODE", &addr)
        .fails()
        .stderr_has(&addr);
}

#[test]
fn unknown_command_fails() {
    rk().args(&["frobnicate"]).fails();
}

#[test]
fn put_without_value_fails() {
    rk().args(&["put", "x"]).fails();
}

#[test]
fn rkd_without_config_prints_usage() {
    let run = rkd().fails().stderr_has("usage: rkd <config.toml>");
    assert_eq!(run.code(), Some(2));
}

#[test]
fn rkd_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rk.toml");
    std::fs::write(
        &path,
        "name = \"\"\nrole = \"leader\"\ndata_dir = \"/tmp/unused\"\n",
    )
    .unwrap();

    rkd().args(&[path.to_str().unwrap()])
        .fails()
        .stderr_has("name must not be empty");
}

#[test]
fn rkd_rejects_missing_config_file() {
    rkd().args(&["/nonexistent/rk.toml"]).fails();
}
