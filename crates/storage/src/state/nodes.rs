// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet membership event handlers.

use std::time::Instant;

use orc_core::{NodeRecord, NodeStatus};

use super::MaterializedState;
use crate::events::Event;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::NodeHeartbeatReceived {
            node_id,
            endpoint,
            capabilities,
            load,
            sequence,
        } => {
            let now = Instant::now();
            let record = state
                .nodes
                .entry(node_id.to_string())
                .or_insert_with(|| NodeRecord::new(node_id.clone(), endpoint.clone(), now));

            // Out-of-order heartbeats are discarded (spec §5 ordering
            // guarantees): a lower sequence than what's on record is stale.
            if *sequence < record.last_sequence {
                return;
            }

            record.endpoint = endpoint.clone();
            record.capabilities = capabilities.iter().cloned().collect();
            record.load = *load;
            record.last_sequence = *sequence;
            record.last_heartbeat = now;
            // A fresh heartbeat always promotes back to active (spec §4.3).
            record.status = NodeStatus::Active;
        }

        Event::NodeEvicted { node_id } => {
            if let Some(record) = state.nodes.get_mut(node_id.as_str()) {
                record.status = NodeStatus::Evicted;
            }
        }

        _ => {}
    }
}
