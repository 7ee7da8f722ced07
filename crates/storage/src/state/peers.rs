// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator peer event handlers — same lifecycle shape as nodes.rs.

use std::time::Instant;

use orc_core::PeerRecord;

use super::MaterializedState;
use crate::events::Event;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    if let Event::PeerHeartbeatReceived {
        peer_id,
        endpoint,
        active_job_count,
        capacity,
        sequence,
    } = event
    {
        let now = Instant::now();
        let record = state
            .peers
            .entry(peer_id.to_string())
            .or_insert_with(|| PeerRecord::new(peer_id.clone(), endpoint.clone(), now));

        if *sequence < record.last_sequence {
            return;
        }

        record.endpoint = endpoint.clone();
        record.active_job_count = *active_job_count;
        record.capacity = *capacity;
        record.last_sequence = *sequence;
        record.last_heartbeat = now;
    }
}
