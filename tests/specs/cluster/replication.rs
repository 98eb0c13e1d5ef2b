//! Cluster replication specs
//!
//! Verify a leader ships its writes to followers over TCP.

use crate::prelude::*;

#[test]
fn single_leader_commits_its_own_writes() {
    let leader = NodeProcess::leader("l1", &[]);

    leader
        .rk()
        .args(&["put", "x", "1"])
        .passes()
        .stdout_eq("put x at index 0\n");
    assert_eq!(get(&leader, "x"), "1");

    let committed = wait_for(SPEC_WAIT_MAX_MS, || {
        leader
            .rk()
            .args(&["progress"])
            .passes()
            .stdout()
            .contains("last_applied=1 commit_index=1")
    });
    assert!(committed);
}

#[test]
fn follower_converges_on_leader_writes() {
    let follower = NodeProcess::follower("f1", None);
    let leader = NodeProcess::leader("l1", &[follower.addr()]);

    leader.rk().args(&["put", "a", "1"]).passes();
    leader.rk().args(&["put", "b", "2"]).passes();
    leader.rk().args(&["delete", "a"]).passes();

    let converged = wait_for(SPEC_WAIT_MAX_MS, || {
        get(&follower, "b") == "2" && get(&follower, "a") == "(not found)"
    });
    assert!(converged, "follower did not converge");

    follower
        .rk()
        .args(&["progress"])
        .passes()
        .stdout_has("last_applied=3 commit_index=3");
    let committed = wait_for(SPEC_WAIT_MAX_MS, || {
        leader
            .rk()
            .args(&["progress"])
            .passes()
            .stdout()
            .contains("commit_index=3")
    });
    assert!(committed, "leader commit did not reach 3");
}

#[test]
fn follower_catches_up_after_restart() {
    let follower = NodeProcess::follower("f1", None);
    let leader = NodeProcess::leader("l1", &[follower.addr()]);
    leader.rk().args(&["put", "a", "1"]).passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || get(&follower, "a") == "1"));

    let addr = follower.addr().to_string();
    let dir = follower.stop();
    leader.rk().args(&["put", "b", "2"]).passes();

    let follower = NodeProcess::restart_follower(dir, "f1", &addr);
    let caught_up = wait_for(SPEC_WAIT_MAX_MS, || get(&follower, "b") == "2");
    assert!(caught_up, "restarted follower did not catch up");
    assert_eq!(get(&follower, "a"), "1");
}

#[test]
fn follower_redirects_writes_to_leader() {
    let leader = NodeProcess::leader("l1", &[]);
    let follower = NodeProcess::follower("f1", Some(leader.addr()));

    follower.rk().args(&["put", "k", "v"]).passes();
    assert_eq!(get(&leader, "k"), "v");
}

#[test]
fn leaderless_follower_rejects_writes() {
    let follower = NodeProcess::follower("f1", None);
    follower
        .rk()
        .args(&["put", "k", "v"])
        .fails()
        .stderr_has("does not know its leader");
}

#[test]
fn delta_lists_replication_log() {
    let leader = NodeProcess::leader("l1", &[]);
    leader.rk().args(&["put", "x", "100"]).passes();
    leader.rk().args(&["delete", "x"]).passes();

    leader
        .rk()
        .args(&["delta", "--from", "-3"])
        .passes()
        .stdout_has("PUT  x = 100")
        .stdout_has("DEL  x");
    leader
        .rk()
        .args(&["--output", "json", "delta", "--from", "1"])
        .passes()
        .stdout_eq("[{\"index\":1,\"kind\":\"DEL\",\"key\":\"x\"}]\n");
}

#[test]
fn get_renders_json() {
    let leader = NodeProcess::leader("l1", &[]);
    leader.rk().args(&["put", "x", "1"]).passes();
    leader
        .rk()
        .args(&["get", "x", "--output", "json"])
        .passes()
        .stdout_eq("{\"key\":\"x\",\"value\":\"1\"}\n");
}
