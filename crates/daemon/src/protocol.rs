// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol shared by `rkd` peers and the `rk` client.
//!
//! Every message is a 4-byte big-endian length followed by that many bytes
//! of JSON. A connection carries one request and one response.

use std::time::Duration;

use rk_core::RoleKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Version reported in `Hello`
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default read/write timeout for one message
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest accepted message body
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Request from a client or the leader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Hello { version: String },
    Get { key: String },
    Put { key: String, value: String },
    Delete { key: String },
    /// Replication packet in payload form, leader to follower
    Replicate { payload: String },
    /// Leader log suffix starting at `from`
    Delta { from: i64 },
    Progress,
    Status,
    Shutdown,
}

/// Response to a [`Request`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Hello {
        version: String,
    },
    Value {
        value: Option<String>,
    },
    Written {
        index: u64,
    },
    Replicated {
        last_applied: u64,
    },
    Delta {
        payload: String,
    },
    Progress {
        last_applied: u64,
        commit_index: u64,
    },
    Status {
        name: String,
        role: RoleKind,
        last_applied: u64,
        commit_index: u64,
        keys: usize,
        uptime_secs: u64,
        peers: Vec<String>,
    },
    NotLeader {
        leader: Option<String>,
    },
    NotFollower,
    OutOfSync {
        expected: u64,
        received: u64,
    },
    ShuttingDown,
    Error {
        message: String,
    },
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("timed out")]
    Timeout,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("message of {0} bytes exceeds limit")]
    TooLarge(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a message to JSON, without the length prefix
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

/// Deserialize a JSON message body
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write a length-prefixed message
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(data.len()));
    }
    let len = data.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a length-prefixed message
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(len));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::ConnectionClosed
        } else {
            ProtocolError::Io(e)
        }
    })?;
    Ok(buf)
}

/// Read one request, failing after `timeout`
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Write one response, failing after `timeout`
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let data = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

/// Connect to `addr`, send `request` and wait for the response
pub async fn call(
    addr: &str,
    request: &Request,
    connect_timeout: Duration,
    timeout: Duration,
) -> Result<Response, ProtocolError> {
    let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    let (mut reader, mut writer) = stream.into_split();

    let data = encode(request)?;
    tokio::time::timeout(timeout, write_message(&mut writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)??;

    let bytes = tokio::time::timeout(timeout, read_message(&mut reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
