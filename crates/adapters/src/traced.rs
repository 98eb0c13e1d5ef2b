// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::follower::{FollowerAdapter, ReplicaError};
use async_trait::async_trait;
use rk_core::ReplicationPacket;
use tracing::Instrument;

/// Wrapper that adds tracing to any FollowerAdapter
#[derive(Clone)]
pub struct TracedFollowerAdapter<F> {
    inner: F,
}

impl<F> TracedFollowerAdapter<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: FollowerAdapter> FollowerAdapter for TracedFollowerAdapter<F> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn replicate(&self, packet: &ReplicationPacket) -> Result<u64, ReplicaError> {
        let span = tracing::info_span!(
            "follower.replicate",
            follower = self.inner.name(),
            from_index = packet.from_index,
        );
        async {
            tracing::debug!(ops = packet.len(), "sending");

            let start = std::time::Instant::now();
            let result = self.inner.replicate(packet).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(last_applied) => tracing::info!(
                    ops = packet.len(),
                    last_applied,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "delivered"
                ),
                // Out-of-sync is routine while a follower catches up
                Err(e @ ReplicaError::OutOfSync { .. }) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "follower out of sync"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "delivery failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
