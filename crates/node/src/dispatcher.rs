// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The node daemon's single dispatcher task (spec §4.6, §5 "single
//! dispatcher task to keep admission order deterministic"): pops the
//! highest-priority ready `WorkItem`, resolves its model artifact, and hands
//! it to a `WorkerSupervisor`. Workers themselves run in parallel, one OS
//! process per work item — only admission order is serialized.

use std::sync::Arc;

use orc_core::error::ExecutionErrorKind;
use orc_core::work_item::PartialOutcome;
use orc_core::{PartialResult, WorkItem};
use orc_storage::MutableNameRegistry;

use crate::job_queue::JobQueue;
use crate::listener::ReplyRegistry;
use crate::resource_accountant::ResourceRequest;
use crate::worker_supervisor::WorkerSupervisor;

pub struct Dispatcher {
    queue: Arc<JobQueue>,
    supervisor: Arc<WorkerSupervisor>,
    model_registry: Arc<dyn MutableNameRegistry>,
    replies: Arc<ReplyRegistry>,
    footprint: ResourceRequest,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<JobQueue>,
        supervisor: Arc<WorkerSupervisor>,
        model_registry: Arc<dyn MutableNameRegistry>,
        replies: Arc<ReplyRegistry>,
        footprint: ResourceRequest,
    ) -> Self {
        Self {
            queue,
            supervisor,
            model_registry,
            replies,
            footprint,
        }
    }

    /// Runs one pop → dispatch cycle; spawns the work so the dispatcher can
    /// immediately go back to popping the next item (spec §5, workers run
    /// in parallel).
    pub async fn step(self: &Arc<Self>) {
        let work = self.queue.pop().await;
        let this = Arc::clone(self);
        tokio::spawn(async move { this.dispatch_one(work).await });
    }

    /// Drives `step` forever; intended to be the body of the dispatcher's
    /// dedicated `tokio::spawn`'d task.
    pub async fn run(self: Arc<Self>) {
        loop {
            self.step().await;
        }
    }

    async fn dispatch_one(&self, work: WorkItem) {
        let result = match self.model_registry.get(work.model_id.as_str()).await {
            Ok(Some(handle)) => self.supervisor.run(work, handle, self.footprint).await,
            Ok(None) => Self::failure(&work, ExecutionErrorKind::ModelFetchFailed),
            Err(err) => {
                tracing::error!(model = %work.model_id, error = %err, "model name resolution failed");
                Self::failure(&work, ExecutionErrorKind::ModelFetchFailed)
            }
        };
        self.replies.complete(result);
    }

    fn failure(work: &WorkItem, kind: ExecutionErrorKind) -> PartialResult {
        PartialResult {
            work_item_id: work.id,
            node_id: work.node_id.clone(),
            outcome: PartialOutcome::Err(kind),
            elapsed: std::time::Duration::ZERO,
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
