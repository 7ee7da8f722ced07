// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WorkerSupervisor` (spec §4.9): runs one `WorkItem` in an isolated OS
//! process for crash isolation and deterministic timeout. Handoff is a
//! structured request/response pair over the worker's stdin/stdout
//! (`orc-worker-exec`); a hard wall-clock deadline is enforced with
//! `SIGTERM` then `SIGKILL` to the worker's process group (SPEC_FULL §2.2).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use orc_core::error::ExecutionErrorKind;
use orc_core::work_item::PartialOutcome;
use orc_core::{PartialResult, WorkItem};
use orc_storage::{BlobHandle, BlobStore};
use orc_worker_exec::{WorkerOutcome, WorkerRequest, WorkerResponse};

use crate::error::SupervisorError;
use crate::model_cache::ModelCache;
use crate::resource_accountant::{ResourceAccountant, ResourceRequest};

pub struct WorkerSupervisor {
    blob_store: Arc<dyn BlobStore>,
    model_cache: Arc<ModelCache>,
    accountant: Arc<ResourceAccountant>,
    worker_exec_path: PathBuf,
    kill_grace_period: Duration,
}

impl WorkerSupervisor {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        model_cache: Arc<ModelCache>,
        accountant: Arc<ResourceAccountant>,
        worker_exec_path: PathBuf,
        kill_grace_period: Duration,
    ) -> Self {
        Self {
            blob_store,
            model_cache,
            accountant,
            worker_exec_path,
            kill_grace_period,
        }
    }

    /// Runs `work` end to end: reserve → fetch model → spawn → await with
    /// deadline → release. Never returns `Err` — every failure mode becomes
    /// a `PartialResult` carrying the appropriate `ExecutionErrorKind`
    /// (spec §4.9), since a `WorkItem`'s outcome is produced exactly once.
    pub async fn run(&self, work: WorkItem, model_handle: BlobHandle, footprint: ResourceRequest) -> PartialResult {
        let started = Instant::now();
        let token = match self.accountant.try_reserve(footprint) {
            Ok(token) => token,
            Err(_) => return self.failure(&work, started, ExecutionErrorKind::ResourceDenied),
        };

        let outcome = self.execute(&work, &model_handle).await;
        self.accountant.release(token);

        match outcome {
            Ok(handle) => PartialResult {
                work_item_id: work.id,
                node_id: work.node_id,
                outcome: PartialOutcome::Ok(handle.0.into()),
                elapsed: started.elapsed(),
            },
            Err(err) => self.failure(&work, started, Self::classify(err)),
        }
    }

    fn failure(&self, work: &WorkItem, started: Instant, kind: ExecutionErrorKind) -> PartialResult {
        PartialResult {
            work_item_id: work.id,
            node_id: work.node_id.clone(),
            outcome: PartialOutcome::Err(kind),
            elapsed: started.elapsed(),
        }
    }

    fn classify(err: SupervisorError) -> ExecutionErrorKind {
        match err {
            SupervisorError::Timeout => ExecutionErrorKind::Timeout,
            SupervisorError::WorkerCrashed(code) => ExecutionErrorKind::WorkerCrashed { exit_code: code },
            SupervisorError::ResourceDenied => ExecutionErrorKind::ResourceDenied,
            SupervisorError::ModelFetchFailed(_) | SupervisorError::InputFetch(_) => {
                ExecutionErrorKind::ModelFetchFailed
            }
            SupervisorError::Spawn(_) | SupervisorError::Decode(_) | SupervisorError::OutputStore(_) => {
                ExecutionErrorKind::WorkerCrashed { exit_code: -1 }
            }
            SupervisorError::WorkerReportedError(_) => ExecutionErrorKind::ModelFetchFailed,
        }
    }

    async fn execute(&self, work: &WorkItem, model_handle: &BlobHandle) -> Result<BlobHandle, SupervisorError> {
        let model = self
            .model_cache
            .acquire(work.model_id.clone(), model_handle)
            .await
            .map_err(SupervisorError::ModelFetchFailed)?;

        let input_bytes = self
            .blob_store
            .get(&BlobHandle(work.inputs_handle.to_string()))
            .await
            .map_err(SupervisorError::InputFetch)?;

        let request = WorkerRequest {
            model_id: work.model_id.clone(),
            model_path: model.path.clone(),
            input_bytes,
        };

        let remaining = work.deadline.saturating_duration_since(Instant::now());
        let result = self.spawn_and_await(&request, remaining).await;
        self.model_cache.release(model);

        let response = result?;
        match response.outcome {
            WorkerOutcome::Ok(bytes) => self.blob_store.put(&bytes).await.map_err(SupervisorError::OutputStore),
            WorkerOutcome::Err(message) => Err(SupervisorError::WorkerReportedError(message)),
        }
    }

    async fn spawn_and_await(&self, request: &WorkerRequest, timeout: Duration) -> Result<WorkerResponse, SupervisorError> {
        let payload = serde_json::to_vec(request).map_err(SupervisorError::Decode)?;

        let mut command = Command::new(&self.worker_exec_path);
        command
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(SupervisorError::Spawn)?;
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(&payload).await;
        }
        let pid = child.id();

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => {
                serde_json::from_slice(&output.stdout).map_err(SupervisorError::Decode)
            }
            Ok(Ok(output)) => Err(SupervisorError::WorkerCrashed(output.status.code().unwrap_or(-1))),
            Ok(Err(err)) => Err(SupervisorError::Spawn(err)),
            Err(_elapsed) => {
                if let Some(pid) = pid {
                    Self::terminate_process_group(pid, self.kill_grace_period).await;
                }
                Err(SupervisorError::Timeout)
            }
        }
    }

    /// `SIGTERM` the worker's process group, then `SIGKILL` if it hasn't
    /// exited within `grace_period` (spec §4.9). Best-effort: the process
    /// may already be gone, which is not itself an error here.
    async fn terminate_process_group(pid: u32, grace_period: Duration) {
        let pgid = Pid::from_raw(-(pid as i32));
        let _ = kill(pgid, Signal::SIGTERM);
        tokio::time::sleep(grace_period).await;
        let _ = kill(pgid, Signal::SIGKILL);
    }
}

#[cfg(test)]
#[path = "worker_supervisor_tests.rs"]
mod tests;
