// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node roles
//!
//! The role is a type parameter on [`crate::Engine`], so leader-only and
//! follower-only operations are not callable on the wrong node.

use crate::replication_log::ReplicationLog;
use rk_core::{Operation, RoleKind};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Leader {}
    impl Sealed for super::Follower {}
}

/// Role-specific hooks the engine calls while applying operations
pub trait Role: sealed::Sealed + Send + Sync + 'static {
    const KIND: RoleKind;

    /// Whether every replayed record counts as committed after recovery
    const REPLAY_COMMITS: bool;

    /// Called for each operation after it is durable and before it is applied
    fn record(&self, op: &Operation);

    /// Drop role-local state ahead of a full replay
    fn reset(&self);
}

/// Accepts client writes and feeds followers from its replication log
#[derive(Debug, Default)]
pub struct Leader {
    log: ReplicationLog,
    followers: Vec<String>,
}

impl Leader {
    /// `followers` are the addresses this leader replicates to
    pub fn new(followers: Vec<String>) -> Self {
        Self {
            log: ReplicationLog::new(),
            followers,
        }
    }

    pub fn log(&self) -> &ReplicationLog {
        &self.log
    }

    pub fn followers(&self) -> &[String] {
        &self.followers
    }
}

impl Role for Leader {
    const KIND: RoleKind = RoleKind::Leader;
    const REPLAY_COMMITS: bool = false;

    fn record(&self, op: &Operation) {
        self.log.append(op.clone());
    }

    fn reset(&self) {
        self.log.clear();
    }
}

/// Applies packets pushed by the leader
#[derive(Debug, Default)]
pub struct Follower {
    leader: Option<String>,
}

impl Follower {
    /// `leader` is where clients get redirected for writes
    pub fn new(leader: Option<String>) -> Self {
        Self { leader }
    }

    pub fn leader(&self) -> Option<&str> {
        self.leader.as_deref()
    }
}

impl Role for Follower {
    const KIND: RoleKind = RoleKind::Follower;
    const REPLAY_COMMITS: bool = true;

    fn record(&self, _op: &Operation) {}

    fn reset(&self) {}
}
