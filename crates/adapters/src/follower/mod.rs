// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of replication packets to followers

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFollowerAdapter, FollowerCall};

use async_trait::async_trait;
use rk_core::ReplicationPacket;
use thiserror::Error;

/// Errors from delivering a packet to a follower
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicaError {
    /// The follower's progress does not match the packet's start
    #[error("follower out of sync: expected fromIndex {expected}, packet started at {received}")]
    OutOfSync { expected: u64, received: u64 },
    /// The follower refused the packet for any other reason
    #[error("follower rejected packet: {0}")]
    Rejected(String),
    /// The packet never reached the follower
    #[error("follower unreachable: {0}")]
    Unreachable(String),
}

/// Adapter for shipping replication packets to one follower
#[async_trait]
pub trait FollowerAdapter: Clone + Send + Sync + 'static {
    /// Stable name for logs (usually the follower's address)
    fn name(&self) -> &str;

    /// Deliver a packet; returns the follower's `last_applied` afterwards
    async fn replicate(&self, packet: &ReplicationPacket) -> Result<u64, ReplicaError>;
}
