// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Facts appended to the write-ahead log. `MaterializedState::apply_event`
//! is the only place that turns a fact into a state mutation.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use orc_core::{JobId, JobSpec, JobState, NodeId, NodeLoad, OrchestratorId, Priority};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    JobSubmitted {
        job_id: JobId,
        spec: JobSpec,
        owner: SmolStr,
        priority: Priority,
        cost_ceiling: Option<f64>,
        owner_replica: SmolStr,
        /// Milliseconds since the Unix epoch at submission time. Persisted
        /// so replay derives the job's real age instead of resetting its
        /// TTL clock to the replay instant (SPEC_FULL §4.1 ephemeral index).
        submitted_at_epoch_ms: u64,
    },
    JobStateChanged {
        job_id: JobId,
        state: JobState,
    },
    JobOwnerChanged {
        job_id: JobId,
        new_owner: OrchestratorId,
    },
    JobIndexSwept {
        job_id: JobId,
    },
    NodeHeartbeatReceived {
        node_id: NodeId,
        endpoint: SmolStr,
        capabilities: Vec<SmolStr>,
        load: NodeLoad,
        sequence: u64,
    },
    NodeEvicted {
        node_id: NodeId,
    },
    PeerHeartbeatReceived {
        peer_id: OrchestratorId,
        endpoint: SmolStr,
        active_job_count: u32,
        capacity: u32,
        sequence: u64,
    },
}
