// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state rebuilt by replaying `Event`s from the write-ahead
//! log (SPEC_FULL §2.2) — events are facts, this struct is derived and
//! always reconstructible from scratch.

mod helpers;
mod jobs;
mod nodes;
mod peers;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use orc_core::{Job, JobId, NodeRecord, PeerRecord};
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// In-memory view derived from the event log. Never mutated directly;
/// callers go through `apply_event` so replay and live application share
/// one code path (SPEC_FULL §2.2 "events are facts, state is derived").
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub jobs: HashMap<String, Job>,
    pub nodes: HashMap<String, NodeRecord>,
    pub peers: HashMap<String, PeerRecord>,
    /// job_id → owning replica, the persisted half of the `active-jobs`
    /// mutable-name record (spec §6.1).
    #[serde(default)]
    pub job_owners: HashMap<String, String>,
}

impl MaterializedState {
    pub fn get_job(&self, id: &str) -> Option<&Job> {
        helpers::find_by_prefix(&self.jobs, id)
    }

    pub fn get_node(&self, id: &str) -> Option<&NodeRecord> {
        helpers::find_by_prefix(&self.nodes, id)
    }

    pub fn get_peer(&self, id: &str) -> Option<&PeerRecord> {
        helpers::find_by_prefix(&self.peers, id)
    }

    pub fn owner_of(&self, job_id: &JobId) -> Option<&str> {
        self.job_owners.get(job_id.as_str()).map(String::as_str)
    }

    /// Apply the staleness sweep rule to every node (spec §4.3). This is a
    /// pure read of `last_heartbeat`, not an event — replaying the log
    /// never depends on wall-clock time, only live queries do (SPEC_FULL
    /// §9 resolves the tension this way).
    pub fn sweep_stale_nodes(&mut self, now: Instant, heartbeat_interval: Duration) {
        for node in self.nodes.values_mut() {
            node.apply_staleness(now, heartbeat_interval);
        }
    }

    /// Drop terminal jobs past their TTL from the fast in-memory index
    /// (SPEC_FULL §4.1 "Ephemeral index & TTL"). The underlying spec/result
    /// blobs are never deleted by this call.
    pub fn sweep_expired_jobs(&mut self, now: Instant, ttl: Duration) -> Vec<JobId> {
        let expired: Vec<JobId> = self
            .jobs
            .values()
            .filter(|job| job.state.is_terminal() && now.saturating_duration_since(job.submitted_at) > ttl)
            .map(|job| job.id)
            .collect();
        for job_id in &expired {
            self.jobs.remove(job_id.as_str());
            self.job_owners.remove(job_id.as_str());
        }
        expired
    }

    /// Apply a single fact to derive the next state (the only mutation path).
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::JobSubmitted { .. }
            | Event::JobStateChanged { .. }
            | Event::JobOwnerChanged { .. }
            | Event::JobIndexSwept { .. } => jobs::apply(self, event),

            Event::NodeHeartbeatReceived { .. } | Event::NodeEvicted { .. } => {
                nodes::apply(self, event)
            }

            Event::PeerHeartbeatReceived { .. } => peers::apply(self, event),
        }
    }
}

#[cfg(test)]
#[path = "../state_tests.rs"]
mod tests;
