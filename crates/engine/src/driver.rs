// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leader-side push replication
//!
//! Each follower has a cursor: the first log index it has not acknowledged.
//! A round sends every follower the log suffix from its cursor, and the
//! cursor moves to the `last_applied` the follower acknowledges. Delivery is
//! at-least-once and in order; the follower's contiguity check drops
//! duplicates.

use crate::engine::Engine;
use crate::role::Leader;
use rk_adapters::{FollowerAdapter, ReplicaError};
use rk_core::ReplicationPacket;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Outcome of one replication round
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub packets_sent: usize,
    pub records_delivered: u64,
    pub failures: usize,
    /// Leader commit index after the round
    pub commit_index: u64,
}

struct Cursor<F> {
    adapter: F,
    next_from_index: u64,
}

/// Pushes the leader's replication log to every follower
pub struct ReplicationDriver<F> {
    leader: Arc<Engine<Leader>>,
    followers: Vec<Cursor<F>>,
}

impl<F: FollowerAdapter> ReplicationDriver<F> {
    /// Cursors start at zero; the first round ships the whole log
    pub fn new(leader: Arc<Engine<Leader>>, followers: Vec<F>) -> Self {
        let followers = followers
            .into_iter()
            .map(|adapter| Cursor {
                adapter,
                next_from_index: 0,
            })
            .collect();
        Self { leader, followers }
    }

    /// Follower names paired with their cursors
    pub fn cursors(&self) -> Vec<(String, u64)> {
        self.followers
            .iter()
            .map(|c| (c.adapter.name().to_string(), c.next_from_index))
            .collect()
    }

    /// Deliver pending records to each follower once
    pub async fn replicate_once(&mut self) -> RoundReport {
        let mut report = RoundReport::default();
        let log = self.leader.replication_log();

        for cursor in &mut self.followers {
            let ops = log.ops_from(cursor.next_from_index);
            if ops.is_empty() {
                continue;
            }

            let packet = ReplicationPacket::new(cursor.next_from_index, ops);
            report.packets_sent += 1;

            match cursor.adapter.replicate(&packet).await {
                Ok(acked) => {
                    // A follower that skipped undecodable lines acks short;
                    // the rest goes out again next round
                    let acked = acked.clamp(packet.from_index, packet.end_index());
                    if acked < packet.end_index() {
                        tracing::warn!(
                            follower = cursor.adapter.name(),
                            sent = packet.end_index(),
                            acked,
                            "follower acknowledged fewer records than sent"
                        );
                    }
                    report.records_delivered += acked - packet.from_index;
                    cursor.next_from_index = acked;
                }
                Err(ReplicaError::OutOfSync { expected, .. }) => {
                    report.failures += 1;
                    let resync = expected.min(log.size());
                    tracing::info!(
                        follower = cursor.adapter.name(),
                        from = cursor.next_from_index,
                        to = resync,
                        "resetting follower cursor"
                    );
                    cursor.next_from_index = resync;
                }
                Err(_) => report.failures += 1,
            }
        }

        let floor = self
            .followers
            .iter()
            .map(|c| c.next_from_index)
            .min()
            .unwrap_or_else(|| self.leader.progress().last_applied);
        report.commit_index = self.leader.advance_commit(floor);
        report
    }

    /// Run rounds every `interval` until `shutdown` turns true or its sender drops
    pub async fn run(mut self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            followers = self.followers.len(),
            interval_ms = interval.as_millis() as u64,
            "replication driver started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.replicate_once().await;
                    if report.packets_sent > 0 {
                        tracing::debug!(?report, "replication round");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("replication driver stopped");
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
