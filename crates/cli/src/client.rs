// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node client for CLI commands

use std::time::Duration;

use rk_daemon::protocol::{self, ProtocolError};
use rk_daemon::{Request, Response, PROTOCOL_VERSION};
use thiserror::Error;

/// Node used when neither `--node` nor `RK_NODE` is given
pub const DEFAULT_NODE: &str = "127.0.0.1:7400";

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for one request/response exchange
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("RK_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for establishing the TCP connection
pub fn timeout_connect() -> Duration {
    parse_duration_ms("RK_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(2))
}

/// Resolve the node address from the flag, then `RK_NODE`, then the default
pub fn resolve_node(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("RK_NODE").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| DEFAULT_NODE.to_string())
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not reach node {addr}: {source}")]
    Unreachable {
        addr: String,
        #[source]
        source: ProtocolError,
    },

    #[error("Node is not the leader")]
    NotLeader { leader: Option<String> },

    #[error("Node is a leader and does not accept replication")]
    NotFollower,

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from node")]
    UnexpectedResponse,
}

/// Node progress as reported by `Progress`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReply {
    pub last_applied: u64,
    pub commit_index: u64,
}

/// Client for one `rkd` node
#[derive(Debug, Clone)]
pub struct NodeClient {
    addr: String,
}

impl NodeClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let response = protocol::call(&self.addr, request, timeout_connect(), timeout_ipc())
            .await
            .map_err(|source| ClientError::Unreachable {
                addr: self.addr.clone(),
                source,
            })?;
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            Response::NotLeader { leader } => Err(ClientError::NotLeader { leader }),
            Response::NotFollower => Err(ClientError::NotFollower),
            other => Ok(other),
        }
    }

    /// Send a write, following one redirect to the leader a follower names
    async fn write(&self, request: Request) -> Result<u64, ClientError> {
        let response = match self.send(&request).await {
            Err(ClientError::NotLeader {
                leader: Some(leader),
            }) if leader != self.addr => {
                tracing::debug!(from = %self.addr, to = %leader, "redirecting write to leader");
                NodeClient::new(leader).send(&request).await?
            }
            other => other?,
        };
        match response {
            Response::Written { index } => Ok(index),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        match self
            .send(&Request::Get {
                key: key.to_string(),
            })
            .await?
        {
            Response::Value { value } => Ok(value),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<u64, ClientError> {
        self.write(Request::Put {
            key: key.to_string(),
            value: value.to_string(),
        })
        .await
    }

    pub async fn delete(&self, key: &str) -> Result<u64, ClientError> {
        self.write(Request::Delete {
            key: key.to_string(),
        })
        .await
    }

    pub async fn progress(&self) -> Result<ProgressReply, ClientError> {
        match self.send(&Request::Progress).await? {
            Response::Progress {
                last_applied,
                commit_index,
            } => Ok(ProgressReply {
                last_applied,
                commit_index,
            }),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Full `Status` response
    pub async fn status(&self) -> Result<Response, ClientError> {
        match self.send(&Request::Status).await? {
            status @ Response::Status { .. } => Ok(status),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Leader log suffix as a replication payload
    pub async fn delta(&self, from: i64) -> Result<String, ClientError> {
        match self.send(&Request::Delta { from }).await? {
            Response::Delta { payload } => Ok(payload),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Handshake; returns the node's protocol version
    pub async fn hello(&self) -> Result<String, ClientError> {
        match self
            .send(&Request::Hello {
                version: PROTOCOL_VERSION.to_string(),
            })
            .await?
        {
            Response::Hello { version } => Ok(version),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Request node shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
