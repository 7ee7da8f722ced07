// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport-agnostic client job API DTOs (spec §6). These are what an HTTP
//! handler, a CLI subprocess talking over a Unix socket, or an in-process
//! test harness all exchange; none of them depend on `reqwest` or `axum`.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use orc_core::{ErrorKind, JobId, JobSpec, NodeId, Priority};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJobRequest {
    pub spec: JobSpec,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub cost_ceiling: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    pub job_id: JobId,
    /// Always `Pending` at submission time; carried explicitly so the DTO
    /// matches the transport contract verbatim (spec §6).
    pub state: SmolStr,
    #[serde(default)]
    pub estimated_completion: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Progress {
    pub completed: u32,
    pub total: u32,
    pub percent: f64,
}

impl Progress {
    pub fn new(completed: u32, total: u32) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            100.0 * f64::from(completed) / f64::from(total)
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStatusEntry {
    pub node_id: NodeId,
    pub status: SmolStr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStatusResponse {
    pub state: SmolStr,
    pub pattern: SmolStr,
    pub progress: Progress,
    /// Advisory-only, never metered at runtime (SPEC_FULL §4.1).
    #[serde(default)]
    pub cost_so_far: Option<f64>,
    #[serde(default)]
    pub per_node_status: Option<Vec<NodeStatusEntry>>,
    #[serde(default)]
    pub error: Option<ErrorKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub nodes_used: Vec<NodeId>,
    pub total_elapsed_ms: u64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GetResultResponse {
    Ready {
        handle: SmolStr,
        metadata: ResultMetadata,
    },
    NotReady,
    Failed {
        error: ErrorKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOutcome {
    Ack,
    NotFound,
    AlreadyTerminal,
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
