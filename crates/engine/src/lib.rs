// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relaykv replication engine

mod driver;
mod engine;
mod error;
mod local;
mod node;
mod replication_log;
mod role;

pub use driver::{ReplicationDriver, RoundReport};
pub use engine::Engine;
pub use error::EngineError;
pub use local::LocalFollower;
pub use node::Node;
pub use replication_log::{LogEntry, ReplicationLog};
pub use role::{Follower, Leader, Role};
