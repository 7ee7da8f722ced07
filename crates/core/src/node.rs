// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet membership record (spec §3 `NodeRecord`, §4.3).

use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A node's self-declared, externally-assigned identifier (e.g. a hostname
/// or a provisioning-system-issued name). Unlike `JobId`/`WorkItemId` these
/// are never minted by this system, so they're a plain interned string
/// rather than a `define_id!` type.
pub type NodeId = SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Active,
    Draining,
    Stale,
    Evicted,
}

crate::simple_display! {
    NodeStatus {
        Active => "active",
        Draining => "draining",
        Stale => "stale",
        Evicted => "evicted",
    }
}

impl NodeStatus {
    /// Invariant (spec §8): a `stale` record is never selectable.
    pub fn is_selectable(&self) -> bool {
        matches!(self, NodeStatus::Active | NodeStatus::Draining)
    }
}

/// A node's reported, point-in-time load, carried on every heartbeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeLoad {
    pub active_jobs: u32,
    pub declared_capacity: u32,
    pub reserved_cpu_fraction: f64,
    pub reserved_memory_fraction: f64,
    pub reserved_slot_fraction: f64,
}

impl NodeLoad {
    /// `loadFraction` from the NodeSelector ranking formula (spec §4.4).
    pub fn load_fraction(&self) -> f64 {
        if self.declared_capacity == 0 {
            return 1.0;
        }
        f64::from(self.active_jobs) / f64::from(self.declared_capacity)
    }
}

/// The control tier's view of one fleet member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub endpoint: SmolStr,
    pub capabilities: BTreeSet<SmolStr>,
    #[serde(skip, default = "Instant::now")]
    pub last_heartbeat: Instant,
    pub last_sequence: u64,
    pub load: NodeLoad,
    /// Reputation in `[0, 1]`, used both as a selection filter and as
    /// fusion weights (weighted-mean aggregation, weighted consensus).
    pub reputation: f64,
    pub status: NodeStatus,
    /// Fraction of recent work items dispatched to this node that failed,
    /// used as the `recentFailureRate` term in the selection score.
    pub recent_failure_rate: f64,
}

impl NodeRecord {
    pub fn new(id: impl Into<NodeId>, endpoint: impl Into<SmolStr>, now: Instant) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            capabilities: BTreeSet::new(),
            last_heartbeat: now,
            last_sequence: 0,
            load: NodeLoad::default(),
            reputation: 0.5,
            status: NodeStatus::Active,
            recent_failure_rate: 0.0,
        }
    }

    /// Apply the staleness sweep rule for a single record (spec §4.3):
    /// `> 3H` silent ⇒ stale, `> 10H` silent ⇒ evicted.
    pub fn apply_staleness(&mut self, now: Instant, heartbeat_interval: std::time::Duration) {
        let silence = now.saturating_duration_since(self.last_heartbeat);
        if silence > heartbeat_interval * 10 {
            self.status = NodeStatus::Evicted;
        } else if silence > heartbeat_interval * 3 {
            self.status = NodeStatus::Stale;
        }
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
