// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory key-value store the WAL is applied to

use crate::operation::Operation;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// Thread-safe key-value map
///
/// Holds nothing that cannot be rebuilt by replaying the WAL.
#[derive(Debug, Default)]
pub struct KvStore {
    data: RwLock<HashMap<String, String>>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, overwriting any existing one
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.data
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Remove a key; absent keys are ignored
    pub fn delete(&self, key: &str) {
        self.data
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    pub fn size(&self) -> usize {
        self.data.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn clear(&self) {
        self.data.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Apply an operation to the map
    pub fn apply(&self, op: &Operation) {
        match op {
            Operation::Put { key, value } => self.put(key.as_str(), value.as_str()),
            Operation::Delete { key } => self.delete(key),
        }
    }

    /// Sorted copy of every entry
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.data
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
#[path = "kv_tests.rs"]
mod tests;
