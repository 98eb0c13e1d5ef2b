// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake follower adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{FollowerAdapter, ReplicaError};
use async_trait::async_trait;
use rk_core::{Operation, ReplicationPacket};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Recorded follower call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerCall {
    pub from_index: u64,
    pub ops: Vec<Operation>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<FollowerCall>,
    applied: Vec<Operation>,
    failures: VecDeque<ReplicaError>,
}

/// Fake follower that enforces contiguity like a real one
#[derive(Clone)]
pub struct FakeFollowerAdapter {
    name: String,
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeFollowerAdapter {
    fn default() -> Self {
        Self::new("fake-follower")
    }
}

impl FakeFollowerAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    /// Make the next delivery fail with the given error
    pub fn fail_next(&self, error: ReplicaError) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failures
            .push_back(error);
    }

    /// Pretend the follower already applied these operations
    pub fn preload(&self, ops: Vec<Operation>) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .applied
            .extend(ops);
    }

    /// Get all recorded calls, including rejected ones
    pub fn calls(&self) -> Vec<FollowerCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Operations the follower accepted, in order
    pub fn applied(&self) -> Vec<Operation> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .applied
            .clone()
    }
}

#[async_trait]
impl FollowerAdapter for FakeFollowerAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn replicate(&self, packet: &ReplicationPacket) -> Result<u64, ReplicaError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(FollowerCall {
            from_index: packet.from_index,
            ops: packet.ops.clone(),
        });

        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }

        let applied = state.applied.len() as u64;
        if packet.from_index != applied {
            return Err(ReplicaError::OutOfSync {
                expected: applied,
                received: packet.from_index,
            });
        }

        state.applied.extend(packet.ops.iter().cloned());
        Ok(state.applied.len() as u64)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
