// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and state machine (spec §3 `Job`, §4.1).

use std::time::Instant;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ErrorKind;
use crate::spec::JobSpec;

crate::define_id! {
    /// Unique identifier for a job instance.
    pub struct JobId("job-");
}

/// Client-declared scheduling priority (spec §4.6 `JobQueue` keys on this).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

crate::simple_display! {
    Priority {
        Low => "low",
        Normal => "normal",
        High => "high",
    }
}

/// The kind of terminal failure attached to a `Failed` job (spec §4.1, §7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureKind(pub ErrorKind);

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The job state machine (spec §4.1): `Pending → Running → (Completed |
/// Failed | Cancelled)`. No state field ever regresses (spec §8 invariant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Completed { result: SmolStr },
    Failed { kind: FailureKind },
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed { .. } | JobState::Failed { .. } | JobState::Cancelled
        )
    }

    /// Legal transition check (spec §4.1 edges). Used by `JobManager` before
    /// writing a new state, and by the bus-replay property test (spec §8).
    pub fn can_transition_to(&self, next: &JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (Pending, Running) => true,
            (Running, Completed { .. } | Failed { .. }) => true,
            (Pending | Running, Cancelled) => true,
            _ => false,
        }
    }
}

/// A client-submitted inference job (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub spec: JobSpec,
    pub owner: SmolStr,
    pub priority: Priority,
    /// Advisory cost ceiling; never enforced at runtime (SPEC_FULL §4.1).
    pub cost_ceiling: Option<f64>,
    pub state: JobState,
    #[serde(skip, default = "Instant::now")]
    pub submitted_at: Instant,
    /// The orchestrator replica that currently owns this job (spec §3
    /// ownership invariant, §4.5 handoff).
    pub owner_replica: SmolStr,
}

impl Job {
    pub fn new(
        id: JobId,
        spec: JobSpec,
        owner: impl Into<SmolStr>,
        priority: Priority,
        cost_ceiling: Option<f64>,
        owner_replica: impl Into<SmolStr>,
        now: Instant,
    ) -> Self {
        Self {
            id,
            spec,
            owner: owner.into(),
            priority,
            cost_ceiling,
            state: JobState::Pending,
            submitted_at: now,
            owner_replica: owner_replica.into(),
        }
    }

    /// Attempt a state transition, returning `false` (no mutation) if the
    /// edge is illegal (spec §4.1 state machine).
    #[must_use]
    pub fn transition(&mut self, next: JobState) -> bool {
        if !self.state.can_transition_to(&next) {
            return false;
        }
        self.state = next;
        true
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct JobBuilder {
    id: JobId,
    spec: Option<JobSpec>,
    owner: SmolStr,
    priority: Priority,
    cost_ceiling: Option<f64>,
    owner_replica: SmolStr,
}

#[cfg(any(test, feature = "test-support"))]
impl Job {
    pub fn builder(spec: JobSpec) -> JobBuilder {
        JobBuilder {
            id: JobId::new(),
            spec: Some(spec),
            owner: SmolStr::new("test-owner"),
            priority: Priority::Normal,
            cost_ceiling: None,
            owner_replica: SmolStr::new("r1"),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    crate::setters! {
        into {
            owner: SmolStr,
            owner_replica: SmolStr,
        }
        set {
            priority: Priority,
        }
        option {
            cost_ceiling: f64,
        }
    }

    pub fn build(self) -> Job {
        Job::new(
            self.id,
            self.spec.expect("spec set by builder()"),
            self.owner,
            self.priority,
            self.cost_ceiling,
            self.owner_replica,
            Instant::now(),
        )
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
