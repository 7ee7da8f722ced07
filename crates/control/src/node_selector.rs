// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `NodeSelector` (SPEC_FULL §4.4): a pure, deterministic ranking function
//! over the fleet view `NodeRegistry` materializes. It never reads the
//! remote mutable-name record directly — only the in-memory snapshot the
//! caller hands it — so selection latency never depends on the registry's
//! own staleness tolerance.

use orc_core::error::SpecErrorKind;
use orc_core::node::{NodeId, NodeRecord};
use smol_str::SmolStr;

/// Selection filters (spec §4.4). `allowlist`, when set, restricts
/// candidates to exactly those ids (used by jobs that pin nodes, e.g.
/// Consensus/Pipeline) rather than ranking the whole fleet.
#[derive(Debug, Clone, Default)]
pub struct SelectFilters {
    pub minimum_reputation: f64,
    pub required_capability: Option<SmolStr>,
    pub allowlist: Option<Vec<NodeId>>,
}

/// Score weights for the ranking formula `w1*reputation - w2*loadFraction
/// - w3*recentFailureRate` (spec §4.4).
#[derive(Debug, Clone, Copy)]
pub struct NodeSelector {
    pub w_reputation: f64,
    pub w_load: f64,
    pub w_failure_rate: f64,
}

impl Default for NodeSelector {
    fn default() -> Self {
        Self {
            w_reputation: 1.0,
            w_load: 1.0,
            w_failure_rate: 1.0,
        }
    }
}

impl NodeSelector {
    fn score(&self, node: &NodeRecord) -> f64 {
        self.w_reputation * node.reputation
            - self.w_load * node.load.load_fraction()
            - self.w_failure_rate * node.recent_failure_rate
    }

    fn matches(&self, node: &NodeRecord, filters: &SelectFilters) -> bool {
        if !node.status.is_selectable() {
            return false;
        }
        if node.reputation < filters.minimum_reputation {
            return false;
        }
        if let Some(capability) = &filters.required_capability {
            if !node.capabilities.contains(capability) {
                return false;
            }
        }
        if let Some(allowlist) = &filters.allowlist {
            if !allowlist.iter().any(|id| id == &node.id) {
                return false;
            }
        }
        true
    }

    /// Select up to `n` candidates satisfying `filters`, ranked by score
    /// descending, ties broken by lexicographic node id (spec §4.4
    /// determinism requirement).
    pub fn select<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a NodeRecord>,
        filters: &SelectFilters,
        n: usize,
    ) -> Result<Vec<&'a NodeRecord>, SpecErrorKind> {
        let mut ranked: Vec<&NodeRecord> = candidates
            .into_iter()
            .filter(|node| self.matches(node, filters))
            .collect();

        ranked.sort_by(|a, b| {
            self.score(b)
                .partial_cmp(&self.score(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        if ranked.len() < n {
            return Err(SpecErrorKind::InsufficientNodes);
        }
        ranked.truncate(n);
        Ok(ranked)
    }
}

#[cfg(test)]
#[path = "node_selector_tests.rs"]
mod tests;
