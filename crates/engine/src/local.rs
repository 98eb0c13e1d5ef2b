// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process follower delivery

use crate::engine::Engine;
use crate::role::Follower;
use async_trait::async_trait;
use rk_adapters::{FollowerAdapter, ReplicaError};
use rk_core::ReplicationPacket;
use std::sync::Arc;

/// Delivers packets straight into a follower engine in the same process
#[derive(Clone)]
pub struct LocalFollower {
    name: String,
    engine: Arc<Engine<Follower>>,
}

impl LocalFollower {
    pub fn new(name: impl Into<String>, engine: Arc<Engine<Follower>>) -> Self {
        Self {
            name: name.into(),
            engine,
        }
    }

    pub fn engine(&self) -> &Arc<Engine<Follower>> {
        &self.engine
    }
}

#[async_trait]
impl FollowerAdapter for LocalFollower {
    fn name(&self) -> &str {
        &self.name
    }

    async fn replicate(&self, packet: &ReplicationPacket) -> Result<u64, ReplicaError> {
        Ok(self.engine.receive_replication(packet)?)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
