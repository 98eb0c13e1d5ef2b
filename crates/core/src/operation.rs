// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log

use std::fmt;

/// Operations that can be persisted to the WAL and replicated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Set a key to a value, overwriting any previous value
    Put { key: String, value: String },

    /// Remove a key
    Delete { key: String },
}

/// Discriminant of an [`Operation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Put,
    Delete,
}

impl Operation {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Operation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A put whose value was not supplied stores the empty string
    pub fn put_default(key: impl Into<String>, value: Option<String>) -> Self {
        Operation::Put {
            key: key.into(),
            value: value.unwrap_or_default(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Operation::Delete { key: key.into() }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Put { .. } => OperationKind::Put,
            Operation::Delete { .. } => OperationKind::Delete,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Operation::Put { key, .. } | Operation::Delete { key } => key,
        }
    }

    /// The value carried by a put; deletes never carry one
    pub fn value(&self) -> Option<&str> {
        match self {
            Operation::Put { value, .. } => Some(value),
            Operation::Delete { .. } => None,
        }
    }
}

impl OperationKind {
    /// Tag used for this kind in a log record
    pub fn tag(self) -> &'static str {
        match self {
            OperationKind::Put => "PUT",
            OperationKind::Delete => "DEL",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "PUT" => Some(OperationKind::Put),
            "DEL" => Some(OperationKind::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Put { key, value } => write!(f, "put {}={}", key, value),
            Operation::Delete { key } => write!(f, "delete {}", key),
        }
    }
}

/// Log name and structured fields for a value
pub trait Traced {
    fn name(&self) -> &'static str;

    fn fields(&self) -> Vec<(&'static str, String)>;
}

impl Traced for Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Put { .. } => "put",
            Operation::Delete { .. } => "delete",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Operation::Put { key, value } => vec![
                ("key", key.clone()),
                ("value_len", value.len().to_string()),
            ],
            Operation::Delete { key } => vec![("key", key.clone())],
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
