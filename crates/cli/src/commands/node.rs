// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node inspection and control commands

use rk_core::{ReplicationPacket, RoleKind};
use rk_daemon::Response;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

use crate::client::{ClientError, NodeClient};
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
pub struct ProgressOutput {
    pub last_applied: u64,
    pub commit_index: u64,
}

impl fmt::Display for ProgressOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "last_applied={} commit_index={}",
            self.last_applied, self.commit_index
        )
    }
}

#[derive(Serialize)]
pub struct StatusOutput {
    pub name: String,
    pub role: RoleKind,
    pub last_applied: u64,
    pub commit_index: u64,
    pub keys: usize,
    pub uptime_secs: u64,
    pub peers: Vec<String>,
}

impl fmt::Display for StatusOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Node: {} ({})", self.name, self.role)?;
        writeln!(f, "  Last applied: {}", self.last_applied)?;
        writeln!(f, "  Commit index: {}", self.commit_index)?;
        writeln!(f, "  Keys: {}", self.keys)?;
        write!(f, "  Uptime: {}s", self.uptime_secs)?;
        let label = match self.role {
            RoleKind::Leader => "Followers",
            RoleKind::Follower => "Leader",
        };
        if !self.peers.is_empty() {
            write!(f, "\n  {}: {}", label, self.peers.join(", "))?;
        }
        Ok(())
    }
}

/// One replication log entry
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DeltaEntry {
    pub index: u64,
    pub kind: &'static str,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl fmt::Display for DeltaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}  {:<3}  {}", self.index, self.kind, self.key)?;
        if let Some(value) = &self.value {
            write!(f, " = {}", value)?;
        }
        Ok(())
    }
}

/// Flatten a delta payload into numbered entries
pub fn delta_entries(payload: &str) -> Result<Vec<DeltaEntry>, ClientError> {
    let decoded = ReplicationPacket::from_payload(payload)
        .map_err(|e| ClientError::Rejected(format!("bad delta payload: {}", e)))?;
    let packet = decoded.packet;
    Ok(packet
        .ops
        .iter()
        .zip(packet.from_index..)
        .map(|(op, index)| DeltaEntry {
            index,
            kind: op.kind().tag(),
            key: op.key().to_string(),
            value: op.value().map(str::to_string),
        })
        .collect())
}

#[derive(Serialize)]
pub struct PingOutput {
    pub node: String,
    pub version: String,
    pub elapsed_ms: u64,
}

impl fmt::Display for PingOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pong from {} (rkd {}, {} ms)",
            self.node, self.version, self.elapsed_ms
        )
    }
}

pub async fn progress(client: &NodeClient, format: OutputFormat) -> Result<(), ClientError> {
    let p = client.progress().await?;
    output::print(
        &ProgressOutput {
            last_applied: p.last_applied,
            commit_index: p.commit_index,
        },
        format,
    );
    Ok(())
}

pub async fn status(client: &NodeClient, format: OutputFormat) -> Result<(), ClientError> {
    let Response::Status {
        name,
        role,
        last_applied,
        commit_index,
        keys,
        uptime_secs,
        peers,
    } = client.status().await?
    else {
        return Err(ClientError::UnexpectedResponse);
    };
    output::print(
        &StatusOutput {
            name,
            role,
            last_applied,
            commit_index,
            keys,
            uptime_secs,
            peers,
        },
        format,
    );
    Ok(())
}

pub async fn delta(client: &NodeClient, from: i64, format: OutputFormat) -> Result<(), ClientError> {
    let payload = client.delta(from).await?;
    output::print_list(&delta_entries(&payload)?, format);
    Ok(())
}

pub async fn ping(client: &NodeClient, format: OutputFormat) -> Result<(), ClientError> {
    let start = Instant::now();
    client.ping().await?;
    let version = client.hello().await?;
    output::print(
        &PingOutput {
            node: client.addr().to_string(),
            version,
            elapsed_ms: start.elapsed().as_millis() as u64,
        },
        format,
    );
    Ok(())
}

pub async fn shutdown(client: &NodeClient) -> Result<(), ClientError> {
    client.shutdown().await?;
    println!("Node {} shutting down", client.addr());
    Ok(())
}
