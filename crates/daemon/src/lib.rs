// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! relaykv daemon library
//!
//! Exposes the wire protocol for the `rk` client and TCP follower delivery
//! for the leader's replication driver.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod protocol;
mod remote;

pub use protocol::{ProtocolError, Request, Response, PROTOCOL_VERSION};
pub use remote::RemoteFollower;
