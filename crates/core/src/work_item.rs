// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-node dispatch unit and its outcome (spec §3 `WorkItem`/`PartialResult`).

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ExecutionErrorKind;
use crate::job::JobId;
use crate::node::NodeId;
use crate::spec::ModelId;

crate::define_id! {
    /// Unique identifier for a single node-targeted unit of work.
    pub struct WorkItemId("wki-");
}

/// One unit of work for a specific node within a job (spec §3).
///
/// Created by `PatternExecutor`; conceptually destroyed when its result is
/// observed or its deadline fires — this struct itself is just the
/// dispatch record, callers drop it on either path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub job_id: JobId,
    pub node_id: NodeId,
    pub model_id: ModelId,
    /// Content-store handle for the input payload.
    pub inputs_handle: SmolStr,
    #[serde(skip, default = "Instant::now")]
    pub deadline: Instant,
}

impl WorkItem {
    pub fn new(
        job_id: JobId,
        node_id: NodeId,
        model_id: ModelId,
        inputs_handle: impl Into<SmolStr>,
        timeout: Duration,
        now: Instant,
    ) -> Self {
        Self {
            id: WorkItemId::new(),
            job_id,
            node_id,
            model_id,
            inputs_handle: inputs_handle.into(),
            deadline: now + timeout,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// The outcome of one `WorkItem`, produced exactly once (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialResult {
    pub work_item_id: WorkItemId,
    pub node_id: NodeId,
    pub outcome: PartialOutcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PartialOutcome {
    /// Content-store handle for the output payload.
    Ok(SmolStr),
    Err(ExecutionErrorKind),
}

impl PartialResult {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, PartialOutcome::Ok(_))
    }
}

#[cfg(test)]
#[path = "work_item_tests.rs"]
mod tests;
