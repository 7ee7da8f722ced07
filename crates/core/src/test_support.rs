// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::time::{Duration, Instant};

use crate::fusion::AggregationKind;
use crate::node::{NodeLoad, NodeRecord, NodeStatus};
use crate::spec::{FanOutSpec, JobSpec};

/// Proptest strategies for core domain types.
pub mod strategies {
    use crate::node::NodeStatus;
    use proptest::prelude::*;

    pub fn arb_node_status() -> impl Strategy<Value = NodeStatus> {
        prop_oneof![
            Just(NodeStatus::Active),
            Just(NodeStatus::Draining),
            Just(NodeStatus::Stale),
            Just(NodeStatus::Evicted),
        ]
    }

    pub fn arb_reputation() -> impl Strategy<Value = f64> {
        0.0f64..=1.0f64
    }
}

/// Build a minimal valid FanOut spec over `nodes`, for tests that only care
/// about dispatch/selection plumbing rather than fusion arithmetic.
pub fn fan_out_spec(model: &str, nodes: &[&str]) -> JobSpec {
    JobSpec::FanOut(FanOutSpec {
        model: model.into(),
        nodes: nodes.iter().map(|n| (*n).into()).collect(),
        data: "sel".into(),
        aggregation: AggregationKind::Mean,
        privacy: None,
        minimum_reputation: 0.0,
        timeout: Duration::from_secs(60),
    })
}

/// An active `NodeRecord` with the given reputation and load, as of `now`.
pub fn active_node(id: &str, reputation: f64, active_jobs: u32, capacity: u32, now: Instant) -> NodeRecord {
    let mut record = NodeRecord::new(id, format!("http://{id}:9000"), now);
    record.reputation = reputation;
    record.status = NodeStatus::Active;
    record.load = NodeLoad {
        active_jobs,
        declared_capacity: capacity,
        ..Default::default()
    };
    record
}
