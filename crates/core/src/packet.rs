// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replication packet and its text payload
//!
//! Payload layout: the first line holds `from_index`, every following
//! non-blank line is one record in the [`crate::codec`] format.

use crate::codec::{decode_record, encode_record};
use crate::operation::Operation;
use thiserror::Error;

/// Contiguous run of operations starting at `from_index` in the leader's log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationPacket {
    pub from_index: u64,
    pub ops: Vec<Operation>,
}

/// Errors decoding a replication payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("empty replication payload")]
    Empty,
    #[error("invalid fromIndex: {0:?}")]
    InvalidIndex(String),
}

/// A decoded payload together with how many record lines were dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    pub packet: ReplicationPacket,
    pub skipped: usize,
}

impl ReplicationPacket {
    pub fn new(from_index: u64, ops: Vec<Operation>) -> Self {
        Self { from_index, ops }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Index one past the last operation in the packet
    pub fn end_index(&self) -> u64 {
        self.from_index + self.ops.len() as u64
    }

    /// Render the packet as a newline-terminated text payload
    pub fn to_payload(&self) -> String {
        let mut out = format!("{}\n", self.from_index);
        for op in &self.ops {
            out.push_str(&encode_record(op));
            out.push('\n');
        }
        out
    }

    /// Parse a text payload; record lines that fail to decode are skipped
    pub fn from_payload(payload: &str) -> Result<DecodedPacket, PacketError> {
        let mut lines = payload.split('\n');
        let first = lines
            .next()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or(PacketError::Empty)?;
        let from_index = first
            .parse::<u64>()
            .map_err(|_| PacketError::InvalidIndex(first.to_string()))?;

        let mut ops = Vec::new();
        let mut skipped = 0;
        for line in lines {
            // Encoded records never contain a raw CR, so one here is a CRLF artifact
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }
            match decode_record(line) {
                Ok(op) => ops.push(op),
                Err(_) => skipped += 1,
            }
        }

        Ok(DecodedPacket {
            packet: ReplicationPacket { from_index, ops },
            skipped,
        })
    }
}

#[cfg(test)]
#[path = "packet_tests.rs"]
mod tests;
