// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Follower delivery over TCP

use std::time::Duration;

use async_trait::async_trait;
use rk_adapters::{FollowerAdapter, ReplicaError};
use rk_core::ReplicationPacket;

use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT};

/// Sends packets to an `rkd` follower at `addr`
#[derive(Debug, Clone)]
pub struct RemoteFollower {
    addr: String,
    connect_timeout: Duration,
    timeout: Duration,
}

impl RemoteFollower {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout: Duration::from_secs(2),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, io: Duration) -> Self {
        self.connect_timeout = connect;
        self.timeout = io;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl FollowerAdapter for RemoteFollower {
    fn name(&self) -> &str {
        &self.addr
    }

    async fn replicate(&self, packet: &ReplicationPacket) -> Result<u64, ReplicaError> {
        let request = Request::Replicate {
            payload: packet.to_payload(),
        };
        let response = protocol::call(&self.addr, &request, self.connect_timeout, self.timeout)
            .await
            .map_err(|e| ReplicaError::Unreachable(e.to_string()))?;

        match response {
            Response::Replicated { last_applied } => Ok(last_applied),
            Response::OutOfSync { expected, received } => {
                Err(ReplicaError::OutOfSync { expected, received })
            }
            Response::NotFollower => Err(ReplicaError::Rejected(
                "peer is not a follower".to_string(),
            )),
            Response::Error { message } => Err(ReplicaError::Rejected(message)),
            other => Err(ReplicaError::Rejected(format!(
                "unexpected response: {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
