// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline strategy (SPEC_FULL §4.2): strictly sequential steps, each
//! step's output handle feeding the next step's input. Step N cannot be
//! dispatched before step N-1's `PartialResult` is observed.

use std::time::Instant;

use smol_str::SmolStr;

use orc_core::error::PipelineErrorKind;
use orc_core::work_item::PartialOutcome;
use orc_core::{Clock, ErrorKind, JobId, PipelineSpec, StepFailurePolicy, WorkItem};

use super::ExecCtx;

pub(crate) async fn run<C: Clock>(
    ctx: &ExecCtx<C>,
    job_id: JobId,
    spec: &PipelineSpec,
    global_deadline: Instant,
) -> Result<SmolStr, ErrorKind> {
    let mut previous: Option<SmolStr> = None;

    for step in &spec.steps {
        let Some(input) = (match step.input_from_step {
            None => step.data.clone(),
            Some(_) => previous.clone(),
        }) else {
            return Err(ErrorKind::Pipeline(PipelineErrorKind { step: step.index }));
        };

        let endpoint = {
            let state = ctx.gateway.read();
            state
                .nodes
                .get(step.node.as_str())
                .filter(|node| node.status.is_selectable())
                .map(|node| node.endpoint.to_string())
                .ok_or(super::node_unavailable())?
        };

        let per_item_timeout = super::remaining(&ctx.clock, global_deadline).min(step.timeout);

        let attempts = match spec.failure_policy {
            StepFailurePolicy::FailFast => 1,
            StepFailurePolicy::RollbackAndRetry => spec.retry_limit + 1,
        };

        let mut handle = None;
        for _ in 0..attempts {
            let work = WorkItem::new(
                job_id,
                step.node.clone(),
                step.model.clone(),
                input.clone(),
                per_item_timeout,
                ctx.clock.now(),
            );
            let dispatched = tokio::time::timeout(per_item_timeout, ctx.transport.dispatch(&endpoint, work)).await;
            match dispatched {
                Ok(Ok(result)) => match result.outcome {
                    PartialOutcome::Ok(out) => {
                        handle = Some(out);
                        break;
                    }
                    PartialOutcome::Err(_) => continue,
                },
                _ => continue,
            }
        }

        match handle {
            Some(out) => previous = Some(out),
            None => return Err(ErrorKind::Pipeline(PipelineErrorKind { step: step.index })),
        }
    }

    previous.ok_or(ErrorKind::Pipeline(PipelineErrorKind { step: 0 }))
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
