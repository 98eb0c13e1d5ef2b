// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replication progress counters

use serde::{Deserialize, Serialize};

/// How far a node has applied and committed its log
///
/// `commit_index <= last_applied` always holds: [`Progress::merge_commit`]
/// clamps anything higher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Count of operations applied to the local state machine
    pub last_applied: u64,
    /// High-water mark believed durable across the cluster
    pub commit_index: u64,
}

impl Progress {
    /// Record one more applied operation
    pub fn advance(&mut self) {
        self.last_applied += 1;
    }

    /// Max-merge the commit index, never moving it backwards or past `last_applied`
    pub fn merge_commit(&mut self, index: u64) {
        let index = index.min(self.last_applied);
        self.commit_index = self.commit_index.max(index);
    }
}
