//! CLI help specs
//!
//! Verify help and completions work without a running node.

use crate::prelude::*;

#[test]
fn rk_help_lists_commands() {
    rk().args(&["--help"])
        .passes()
        .stdout_has("get")
        .stdout_has("put")
        .stdout_has("delta")
        .stdout_has("--node");
}

#[test]
fn rk_version_prints_version() {
    rk().args(&["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn completions_do_not_need_a_node() {
    rk().args(&["completions", "bash"])
        .env("RK_NODE", "127.0.0.1:1")
        .passes()
        .stdout_has("rk");
}
