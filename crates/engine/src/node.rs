// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role-erased handle for transport code
//!
//! The daemon learns its role from configuration at runtime, so it holds a
//! `Node` and gets role violations back as errors instead of type errors.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::replication_log::LogEntry;
use crate::role::{Follower, Leader};
use rk_core::{Progress, ReplicationPacket, RoleKind};
use std::sync::Arc;

#[derive(Clone)]
pub enum Node {
    Leader(Arc<Engine<Leader>>),
    Follower(Arc<Engine<Follower>>),
}

impl Node {
    pub fn role(&self) -> RoleKind {
        match self {
            Node::Leader(_) => RoleKind::Leader,
            Node::Follower(_) => RoleKind::Follower,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            Node::Leader(e) => e.get(key),
            Node::Follower(e) => e.get(key),
        }
    }

    pub fn progress(&self) -> Progress {
        match self {
            Node::Leader(e) => e.progress(),
            Node::Follower(e) => e.progress(),
        }
    }

    pub fn key_count(&self) -> usize {
        match self {
            Node::Leader(e) => e.key_count(),
            Node::Follower(e) => e.key_count(),
        }
    }

    pub fn put(&self, key: String, value: String) -> Result<u64, EngineError> {
        self.leader()?.put(key, value)
    }

    pub fn delete(&self, key: String) -> Result<u64, EngineError> {
        self.leader()?.delete(key)
    }

    pub fn replication_delta(&self, from: i64) -> Result<Vec<LogEntry>, EngineError> {
        Ok(self.leader()?.replication_delta(from))
    }

    pub fn receive_replication(&self, packet: &ReplicationPacket) -> Result<u64, EngineError> {
        match self {
            Node::Follower(e) => e.receive_replication(packet),
            Node::Leader(_) => Err(EngineError::NotFollower),
        }
    }

    /// Addresses this node talks to: followers for a leader, the leader for a follower
    pub fn peers(&self) -> Vec<String> {
        match self {
            Node::Leader(e) => e.followers().to_vec(),
            Node::Follower(e) => e.leader().map(str::to_string).into_iter().collect(),
        }
    }

    fn leader(&self) -> Result<&Engine<Leader>, EngineError> {
        match self {
            Node::Leader(e) => Ok(e.as_ref()),
            Node::Follower(e) => Err(EngineError::NotLeader {
                leader: e.leader().map(str::to_string),
            }),
        }
    }
}

impl From<Arc<Engine<Leader>>> for Node {
    fn from(engine: Arc<Engine<Leader>>) -> Self {
        Node::Leader(engine)
    }
}

impl From<Arc<Engine<Follower>>> for Node {
    fn from(engine: Arc<Engine<Follower>>) -> Self {
        Node::Follower(engine)
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
