// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator peer record (spec §3 `PeerRecord`, §4.5). Same lifecycle
//! shape as `NodeRecord` but tracks replica load rather than fleet load.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub type OrchestratorId = SmolStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRecord {
    pub id: OrchestratorId,
    pub endpoint: SmolStr,
    #[serde(skip, default = "Instant::now")]
    pub last_heartbeat: Instant,
    pub last_sequence: u64,
    pub active_job_count: u32,
    pub capacity: u32,
}

impl PeerRecord {
    pub fn new(id: impl Into<OrchestratorId>, endpoint: impl Into<SmolStr>, now: Instant) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            last_heartbeat: now,
            last_sequence: 0,
            active_job_count: 0,
            capacity: 1,
        }
    }

    /// Reported load as a fraction of declared capacity, used by
    /// `PeerCoordinator` handoff decisions (spec §4.5).
    pub fn load_fraction(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        f64::from(self.active_job_count) / f64::from(self.capacity)
    }

    pub fn is_stale(&self, now: Instant, heartbeat_interval: std::time::Duration) -> bool {
        now.saturating_duration_since(self.last_heartbeat) > heartbeat_interval * 3
    }
}

#[cfg(test)]
#[path = "peer_tests.rs"]
mod tests;
