// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `JobManager` (SPEC_FULL §4.1): owns the client-facing job API and the
//! `Pending → Running → (Completed | Failed | Cancelled)` state machine.
//! Dispatch mechanics live entirely in `PatternExecutor`; this module only
//! validates, persists, and tracks cancellation handles.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;

use orc_core::error::SpecErrorKind;
use orc_core::{Clock, JobId, JobSpec, JobState, Priority};
use orc_storage::{Event, StateGateway};
use orc_wire::{CancelOutcome, GetResultResponse, GetStatusResponse, Progress, ResultMetadata};

use crate::env;
use crate::error::JobManagerError;
use crate::pattern_executor::PatternExecutor;
use crate::rate_limiter::RateLimiter;

pub struct JobManager<C: Clock> {
    gateway: Arc<StateGateway>,
    executor: Arc<PatternExecutor<C>>,
    clock: C,
    replica_id: SmolStr,
    cancel_tokens: Mutex<HashMap<JobId, CancellationToken>>,
    rate_limiter: RateLimiter,
}

impl<C: Clock + 'static> JobManager<C> {
    pub fn new(gateway: Arc<StateGateway>, executor: Arc<PatternExecutor<C>>, clock: C, replica_id: impl Into<SmolStr>) -> Self {
        Self::with_rate_limits(gateway, executor, clock, replica_id, env::RateLimits::default())
    }

    pub fn with_rate_limits(
        gateway: Arc<StateGateway>,
        executor: Arc<PatternExecutor<C>>,
        clock: C,
        replica_id: impl Into<SmolStr>,
        rate_limits: env::RateLimits,
    ) -> Self {
        Self {
            gateway,
            executor,
            clock,
            replica_id: replica_id.into(),
            cancel_tokens: Mutex::new(HashMap::new()),
            rate_limiter: RateLimiter::new(rate_limits),
        }
    }

    /// Validate, persist, and kick off dispatch for a new job (SPEC_FULL
    /// §4.1 validation + cost-ceiling pre-check). Returns the new job id.
    pub fn submit(
        &self,
        spec: JobSpec,
        owner: impl Into<SmolStr>,
        priority: Priority,
        cost_ceiling: Option<f64>,
    ) -> Result<JobId, JobManagerError> {
        let owner = owner.into();

        if !self.rate_limiter.try_admit(owner.as_str(), priority, self.clock.now()) {
            return Err(JobManagerError::RateLimited);
        }

        if !spec.structurally_valid() {
            return Err(JobManagerError::BadSpec(SpecErrorKind::BadSpec));
        }

        {
            let state = self.gateway.read();
            for node_id in spec.referenced_nodes() {
                let active = state
                    .get_node(node_id.as_str())
                    .is_some_and(|node| node.status.is_selectable());
                if !active {
                    return Err(JobManagerError::BadSpec(SpecErrorKind::BadSpec));
                }
            }
            if let Some(minimum) = spec.minimum_reputation() {
                let max_reputation = state.nodes.values().map(|node| node.reputation).fold(0.0, f64::max);
                if minimum > max_reputation {
                    return Err(JobManagerError::BadSpec(SpecErrorKind::BadSpec));
                }
            }
        }

        if let Some(ceiling) = cost_ceiling {
            let estimate = dispatch_unit_count(&spec) as f64 * env::cost_unit();
            if estimate > ceiling * env::cost_slack_factor() {
                return Err(JobManagerError::BadSpec(SpecErrorKind::BadSpec));
            }
        }

        let job_id = JobId::new();
        self.gateway.apply(Event::JobSubmitted {
            job_id,
            spec,
            owner: owner.into(),
            priority,
            cost_ceiling,
            owner_replica: self.replica_id.clone(),
            submitted_at_epoch_ms: self.clock.epoch_ms(),
        })?;

        let cancel = CancellationToken::new();
        self.cancel_tokens.lock().insert(job_id, cancel.clone());
        let executor = self.executor.clone();
        tokio::spawn(async move {
            executor.run(job_id, cancel).await;
        });

        Ok(job_id)
    }

    pub fn status(&self, job_id: JobId) -> Option<GetStatusResponse> {
        let state = self.gateway.read();
        let job = state.get_job(job_id.as_str())?;
        let total = dispatch_unit_count(&job.spec);
        let (completed, error) = match &job.state {
            JobState::Completed { .. } => (total, None),
            JobState::Failed { kind } => (0, Some(kind.0.clone())),
            JobState::Pending | JobState::Running | JobState::Cancelled => (0, None),
        };
        Some(GetStatusResponse {
            state: SmolStr::new(state_label(&job.state)),
            pattern: SmolStr::new(job.spec.pattern_name()),
            progress: Progress::new(completed, total),
            cost_so_far: job.cost_ceiling.map(|_| f64::from(total) * env::cost_unit()),
            per_node_status: None,
            error,
        })
    }

    /// Best-effort cancel: flips the cancellation token the running
    /// `PatternExecutor` is racing against. Already-terminal jobs reject
    /// cancel, matching the state machine's `Any non-terminal → Cancelled`
    /// edge (SPEC_FULL §4.1).
    pub fn cancel(&self, job_id: JobId) -> CancelOutcome {
        let is_terminal = match self.gateway.read().get_job(job_id.as_str()) {
            None => return CancelOutcome::NotFound,
            Some(job) => job.state.is_terminal(),
        };
        if is_terminal {
            return CancelOutcome::AlreadyTerminal;
        }
        if let Some(token) = self.cancel_tokens.lock().get(&job_id) {
            token.cancel();
        }
        CancelOutcome::Ack
    }

    pub fn result(&self, job_id: JobId) -> Option<GetResultResponse> {
        let state = self.gateway.read();
        let job = state.get_job(job_id.as_str())?;
        Some(match &job.state {
            JobState::Completed { result } => GetResultResponse::Ready {
                handle: result.clone(),
                metadata: ResultMetadata {
                    nodes_used: job.spec.referenced_nodes(),
                    total_elapsed_ms: self.clock.now().saturating_duration_since(job.submitted_at).as_millis() as u64,
                    total_cost: f64::from(dispatch_unit_count(&job.spec)) * env::cost_unit(),
                },
            },
            JobState::Failed { kind } => GetResultResponse::Failed { error: kind.0.clone() },
            JobState::Pending | JobState::Running | JobState::Cancelled => GetResultResponse::NotReady,
        })
    }

    /// Runs the terminal-job TTL sweep and the node staleness sweep
    /// together (SPEC_FULL §4.1 "piggybacked on the same interval as the
    /// NodeRegistry staleness sweep"). Exposed standalone so tests can
    /// drive it deterministically without waiting on a real timer.
    pub fn sweep_once(&self) {
        self.gateway
            .sweep_stale_nodes(self.clock.now(), env::heartbeat_interval());
        for job_id in self.gateway.sweep_expired_jobs(self.clock.now(), env::job_index_ttl()) {
            self.cancel_tokens.lock().remove(&job_id);
        }
    }

    /// Spawns the periodic sweep loop on the current runtime. Returns the
    /// handle so the owning binary can abort it on shutdown.
    pub fn spawn_sweep_loop(self: Arc<Self>) -> tokio::task::JoinHandle<()>
    where
        C: Send + Sync,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(env::heartbeat_interval());
            loop {
                ticker.tick().await;
                self.sweep_once();
            }
        })
    }
}

fn dispatch_unit_count(spec: &JobSpec) -> u32 {
    match spec {
        JobSpec::FanOut(s) => s.nodes.len() as u32,
        JobSpec::Consensus(s) => s.models.len() as u32,
        JobSpec::Pipeline(s) => s.steps.len() as u32,
    }
}

fn state_label(state: &JobState) -> &'static str {
    match state {
        JobState::Pending => "pending",
        JobState::Running => "running",
        JobState::Completed { .. } => "completed",
        JobState::Failed { .. } => "failed",
        JobState::Cancelled => "cancelled",
    }
}

#[cfg(test)]
#[path = "job_manager_tests.rs"]
mod tests;
