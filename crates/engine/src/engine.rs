// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The replicated state machine
//!
//! Every mutation is made durable in the WAL before it touches the store.
//! The WAL mutex is held for the whole of a mutation, which serializes
//! writers and keeps WAL order, log order and apply order identical.

use crate::error::EngineError;
use crate::replication_log::{LogEntry, ReplicationLog};
use crate::role::{Follower, Leader, Role};
use rk_core::{KvStore, Operation, Progress, ReplicationPacket, RoleKind, Traced};
use rk_storage::Wal;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

/// A key-value state machine backed by a WAL, parameterized by role
pub struct Engine<R: Role> {
    wal: Mutex<Wal>,
    store: KvStore,
    progress: RwLock<Progress>,
    role: R,
}

impl<R: Role> Engine<R> {
    /// Open the WAL at `path` and rebuild state from it
    pub fn open(path: &Path, role: R) -> Result<Self, EngineError> {
        let wal = Wal::open(path)?;
        let engine = Self {
            wal: Mutex::new(wal),
            store: KvStore::new(),
            progress: RwLock::new(Progress::default()),
            role,
        };
        engine.recover()?;
        Ok(engine)
    }

    /// Discard in-memory state and replay the WAL from the start
    ///
    /// Returns the number of records replayed. A corrupt WAL is quarantined
    /// by the storage layer and recovery proceeds from empty.
    pub fn recover(&self) -> Result<u64, EngineError> {
        let mut wal = self.wal.lock().unwrap_or_else(|e| e.into_inner());
        let ops = wal.read_all()?;

        self.store.clear();
        self.role.reset();
        {
            let mut progress = self.progress.write().unwrap_or_else(|e| e.into_inner());
            progress.last_applied = 0;
        }

        for op in &ops {
            self.apply(op);
        }

        let mut progress = self.progress.write().unwrap_or_else(|e| e.into_inner());
        if R::REPLAY_COMMITS {
            let last_applied = progress.last_applied;
            progress.merge_commit(last_applied);
        } else {
            progress.commit_index = progress.commit_index.min(progress.last_applied);
        }

        tracing::info!(
            role = %R::KIND,
            replayed = ops.len(),
            last_applied = progress.last_applied,
            commit_index = progress.commit_index,
            "recovered from wal"
        );
        Ok(ops.len() as u64)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    pub fn progress(&self) -> Progress {
        *self.progress.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn key_count(&self) -> usize {
        self.store.size()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.store.snapshot()
    }

    pub fn role(&self) -> &R {
        &self.role
    }

    pub fn role_kind(&self) -> RoleKind {
        R::KIND
    }

    /// Apply one durable operation and return the index it landed at
    ///
    /// Callers must hold the WAL lock.
    fn apply(&self, op: &Operation) -> u64 {
        let mut progress = self.progress.write().unwrap_or_else(|e| e.into_inner());
        let index = progress.last_applied;
        self.role.record(op);
        self.store.apply(op);
        progress.advance();
        tracing::debug!(op = op.name(), fields = ?op.fields(), index, "applied");
        index
    }
}

impl Engine<Leader> {
    /// Set `key` to `value`, returning the operation's index
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) -> Result<u64, EngineError> {
        self.write(Operation::put(key, value))
    }

    /// Remove `key`, returning the operation's index
    ///
    /// Deleting a missing key is still logged and replicated.
    pub fn delete(&self, key: impl Into<String>) -> Result<u64, EngineError> {
        self.write(Operation::delete(key))
    }

    fn write(&self, op: Operation) -> Result<u64, EngineError> {
        let mut wal = self.wal.lock().unwrap_or_else(|e| e.into_inner());
        wal.append(&op)?;
        Ok(self.apply(&op))
    }

    /// Log entries at or after `from`
    pub fn replication_delta(&self, from: i64) -> Vec<LogEntry> {
        self.role.log().get_from_index(from)
    }

    pub fn replication_log(&self) -> &ReplicationLog {
        self.role.log()
    }

    pub fn followers(&self) -> &[String] {
        self.role.followers()
    }

    /// Max-merge the commit index, returning the resulting value
    pub fn advance_commit(&self, index: u64) -> u64 {
        let mut progress = self.progress.write().unwrap_or_else(|e| e.into_inner());
        progress.merge_commit(index);
        progress.commit_index
    }
}

impl Engine<Follower> {
    /// Apply a packet from the leader, returning the new `last_applied`
    ///
    /// The packet must start exactly at this node's `last_applied`. Its
    /// records reach the WAL in one write before any of them is applied, so a
    /// failed packet leaves no trace.
    pub fn receive_replication(&self, packet: &ReplicationPacket) -> Result<u64, EngineError> {
        let mut wal = self.wal.lock().unwrap_or_else(|e| e.into_inner());

        let expected = self.progress().last_applied;
        if packet.from_index != expected {
            tracing::warn!(
                expected,
                received = packet.from_index,
                "rejecting out-of-sync packet"
            );
            return Err(EngineError::OutOfSync {
                expected,
                received: packet.from_index,
            });
        }

        wal.append_batch(&packet.ops)?;
        for op in &packet.ops {
            self.apply(op);
        }

        let mut progress = self.progress.write().unwrap_or_else(|e| e.into_inner());
        let last_applied = progress.last_applied;
        progress.merge_commit(last_applied);
        tracing::info!(
            from_index = packet.from_index,
            ops = packet.len(),
            last_applied,
            "applied replication packet"
        );
        Ok(last_applied)
    }

    pub fn leader(&self) -> Option<&str> {
        self.role.leader()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
