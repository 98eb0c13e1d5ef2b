// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leader-side replication log
//!
//! Append-only and never compacted, so it grows for the life of the leader
//! process. Compacting it would change what a delta query from an old index
//! returns.

use rk_core::Operation;
use std::sync::RwLock;

/// One operation and its zero-based position in leader append order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub index: u64,
    pub op: Operation,
}

/// In-memory ordered record of every operation the leader applied
#[derive(Debug, Default)]
pub struct ReplicationLog {
    entries: RwLock<Vec<Operation>>,
}

impl ReplicationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the next free index and return that index
    pub fn append(&self, op: Operation) -> u64 {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(op);
        entries.len() as u64 - 1
    }

    /// Every entry at or after `from`
    ///
    /// Negative indexes read from the start; indexes past the end yield
    /// nothing.
    pub fn get_from_index(&self, from: i64) -> Vec<LogEntry> {
        let start = u64::try_from(from).unwrap_or(0);
        self.ops_from(start)
            .into_iter()
            .zip(start..)
            .map(|(op, index)| LogEntry { index, op })
            .collect()
    }

    /// Operations at or after `from`, without their indexes
    pub fn ops_from(&self, from: u64) -> Vec<Operation> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        match usize::try_from(from) {
            Ok(start) if start < entries.len() => entries[start..].to_vec(),
            _ => Vec::new(),
        }
    }

    /// Next free index
    pub fn size(&self) -> u64 {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len() as u64
    }

    pub(crate) fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
#[path = "replication_log_tests.rs"]
mod tests;
