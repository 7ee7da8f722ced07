// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bus envelope shared by every topic (spec §6.1).

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use orc_core::{ErrorKind, JobId, JobState, NodeId, NodeLoad, OrchestratorId};

/// Envelope wrapping every payload published on the topic bus. Unknown
/// fields are ignored on decode so older/newer replicas can interoperate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: SmolStr,
    pub sender_id: SmolStr,
    pub sequence: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub body: EnvelopeBody,
}

/// The per-topic payload shapes (spec §6.1 topic list).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum EnvelopeBody {
    JobUpdate {
        job_id: JobId,
        state: JobState,
    },
    JobCancel {
        job_id: JobId,
    },
    NodeHeartbeat {
        node_id: NodeId,
        endpoint: SmolStr,
        capabilities: Vec<SmolStr>,
        load: NodeLoad,
    },
    OrchestratorHeartbeat {
        orchestrator_id: OrchestratorId,
        endpoint: SmolStr,
        active_job_count: u32,
        capacity: u32,
    },
    HandoffOffer {
        job_id: JobId,
        from: OrchestratorId,
    },
    HandoffAccept {
        job_id: JobId,
        by: OrchestratorId,
    },
    ResultReady {
        job_id: JobId,
        handle: SmolStr,
    },
    JobFailed {
        job_id: JobId,
        error: ErrorKind,
    },
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
