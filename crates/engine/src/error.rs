// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the replicated state machine

use rk_adapters::ReplicaError;
use rk_storage::WalError;
use thiserror::Error;

/// Errors that can occur in the engine
///
/// Role violations and out-of-sync packets are separate variants so callers
/// can tell "retry from another index" apart from "wrong node".
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Wal(#[from] WalError),
    #[error("not leader")]
    NotLeader { leader: Option<String> },
    #[error("leader does not accept replication")]
    NotFollower,
    #[error("Out of sync: expected fromIndex {expected}, got {received}")]
    OutOfSync { expected: u64, received: u64 },
}

impl EngineError {
    /// True when resending from the follower's reported progress can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::OutOfSync { .. })
    }
}

impl From<EngineError> for ReplicaError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::OutOfSync { expected, received } => {
                ReplicaError::OutOfSync { expected, received }
            }
            other => ReplicaError::Rejected(other.to_string()),
        }
    }
}
