// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rk-core: value types shared by every relaykv crate
//!
//! This crate provides:
//! - The `Operation` state-machine command
//! - The line-oriented record codec used by both the WAL and replication
//! - The replication packet payload format
//! - The concurrent in-memory key-value store
//! - Progress counters and role kinds

pub mod codec;
pub mod kv;
pub mod operation;
pub mod packet;
pub mod progress;
pub mod role;

// Re-exports
pub use codec::{decode_record, encode_record, DecodeError};
pub use kv::KvStore;
pub use operation::{Operation, OperationKind, Traced};
pub use packet::{DecodedPacket, PacketError, ReplicationPacket};
pub use progress::Progress;
pub use role::RoleKind;
