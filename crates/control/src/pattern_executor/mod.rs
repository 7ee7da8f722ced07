// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PatternExecutor` (SPEC_FULL §4.2): one instance per `Job`, destroyed on
//! termination. Owns dispatch, collection, and fusion for whichever of the
//! three patterns the job's spec names; `JobManager` spawns one of these
//! per submitted job and never touches dispatch mechanics itself.

mod consensus;
mod fan_out;
mod fusion;
mod pipeline;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;

use orc_core::error::DispatchErrorKind;
use orc_core::{Clock, ErrorKind, JobId, JobSpec, JobState};
use orc_adapters::{BusAdapter, NodeTransport};
use orc_storage::StateGateway;
use orc_wire::{Envelope, EnvelopeBody, Topic};

use crate::node_selector::NodeSelector;

/// Shared context every pattern strategy dispatches through. Plain struct
/// rather than a trait object since the three strategies are free
/// functions, not swappable implementations (spec §9 "tagged variant, not
/// inheritance").
pub(crate) struct ExecCtx<C: Clock> {
    pub gateway: Arc<StateGateway>,
    pub bus: Arc<dyn BusAdapter>,
    pub transport: Arc<dyn NodeTransport>,
    pub selector: NodeSelector,
    pub clock: C,
}

pub struct PatternExecutor<C: Clock> {
    ctx: Arc<ExecCtx<C>>,
    replica_id: SmolStr,
    sequence: AtomicU64,
}

impl<C: Clock + 'static> PatternExecutor<C> {
    pub fn new(
        gateway: Arc<StateGateway>,
        bus: Arc<dyn BusAdapter>,
        transport: Arc<dyn NodeTransport>,
        selector: NodeSelector,
        clock: C,
        replica_id: impl Into<SmolStr>,
    ) -> Self {
        Self {
            ctx: Arc::new(ExecCtx {
                gateway,
                bus,
                transport,
                selector,
                clock,
            }),
            replica_id: replica_id.into(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Run a single job to completion, failure, or cancellation. Consumes
    /// no ownership of `job_id` beyond this call — the job's durable state
    /// lives entirely in `StateGateway`.
    pub async fn run(&self, job_id: JobId, cancel: CancellationToken) {
        let Some(job) = self.ctx.gateway.read().get_job(job_id.as_str()).cloned() else {
            tracing::warn!(job = %job_id, "pattern executor started for unknown job");
            return;
        };

        self.transition(job_id, JobState::Running).await;

        let global_deadline = self.ctx.clock.now() + job.spec.timeout();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => PatternOutcome::Cancelled,
            result = self.dispatch(job_id, &job.spec, global_deadline) => match result {
                Ok(handle) => PatternOutcome::Completed(handle),
                Err(kind) => PatternOutcome::Failed(kind),
            },
        };

        match outcome {
            PatternOutcome::Completed(handle) => {
                self.transition(job_id, JobState::Completed { result: handle.clone() })
                    .await;
                let _ = self
                    .ctx
                    .bus
                    .publish(Topic::ResultsReady, self.envelope(EnvelopeBody::ResultReady { job_id, handle }))
                    .await;
            }
            PatternOutcome::Failed(kind) => {
                self.transition(job_id, JobState::Failed { kind: orc_core::FailureKind(kind.clone()) })
                    .await;
                let _ = self
                    .ctx
                    .bus
                    .publish(Topic::JobsUpdates, self.envelope(EnvelopeBody::JobFailed { job_id, error: kind }))
                    .await;
            }
            PatternOutcome::Cancelled => {
                self.transition(job_id, JobState::Cancelled).await;
            }
        }
    }

    async fn dispatch(
        &self,
        job_id: JobId,
        spec: &JobSpec,
        global_deadline: std::time::Instant,
    ) -> Result<SmolStr, ErrorKind> {
        match spec {
            JobSpec::FanOut(s) => fan_out::run(&self.ctx, job_id, s, global_deadline).await,
            JobSpec::Consensus(s) => consensus::run(&self.ctx, job_id, s, global_deadline).await,
            JobSpec::Pipeline(s) => pipeline::run(&self.ctx, job_id, s, global_deadline).await,
        }
    }

    async fn transition(&self, job_id: JobId, state: JobState) {
        if let Err(err) = self
            .ctx
            .gateway
            .apply(orc_storage::Event::JobStateChanged { job_id, state: state.clone() })
        {
            tracing::error!(job = %job_id, error = %err, "failed to persist job state transition");
            return;
        }
        let _ = self
            .ctx
            .bus
            .publish(Topic::JobsUpdates, self.envelope(EnvelopeBody::JobUpdate { job_id, state }))
            .await;
    }

    fn envelope(&self, body: EnvelopeBody) -> Envelope {
        Envelope {
            kind: SmolStr::new("event"),
            sender_id: self.replica_id.clone(),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            timestamp: chrono::Utc::now(),
            body,
        }
    }
}

enum PatternOutcome {
    Completed(SmolStr),
    Failed(ErrorKind),
    Cancelled,
}

/// Remaining time until `deadline`, floored at zero rather than producing a
/// negative/underflowed duration (spec §5 "deadline wins over late success").
pub(crate) fn remaining(clock: &impl Clock, deadline: std::time::Instant) -> Duration {
    deadline.saturating_duration_since(clock.now())
}

pub(crate) fn node_unavailable() -> ErrorKind {
    ErrorKind::Dispatch(DispatchErrorKind::NodeUnavailable)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
