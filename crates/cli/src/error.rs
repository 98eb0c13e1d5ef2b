// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.

use std::fmt;

use crate::client::ClientError;

/// Error with context and recovery suggestions for terminal display.
#[derive(Debug)]
pub struct RkError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl RkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl fmt::Display for RkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for RkError {}

impl From<&ClientError> for RkError {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Unreachable { addr, source } => {
                RkError::new(format!("Could not reach node at {}", addr))
                    .with_context(source.to_string())
                    .with_suggestion("Check that rkd is running and printed READY")
                    .with_suggestion("Point at another node with --node ADDR or RK_NODE")
            }
            ClientError::NotLeader { leader: Some(leader) } => {
                RkError::new("Write was not accepted by the leader")
                    .with_context(format!("Leader {} did not accept the redirected write", leader))
                    .with_suggestion(format!("Check the leader: rk --node {} status", leader))
            }
            ClientError::NotLeader { leader: None } => {
                RkError::new("Node is a follower and does not know its leader")
                    .with_suggestion("Send writes to the leader with --node ADDR")
                    .with_suggestion("Set `leader` in the follower's config to enable redirects")
            }
            other => RkError::new(other.to_string()),
        }
    }
}
