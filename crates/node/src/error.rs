// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types local to the node-daemon crate boundary (spec §7).

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    #[error("resource request exceeds declared budget")]
    Denied,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelCacheError {
    #[error("fetching model artifact: {0}")]
    Fetch(#[from] orc_storage::StorageError),
    #[error("cache is full and has no evictable entries")]
    CacheFull,
}

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("resource admission denied")]
    ResourceDenied,
    #[error("model fetch failed: {0}")]
    ModelFetchFailed(#[source] ModelCacheError),
    #[error("fetching work item input: {0}")]
    InputFetch(#[source] orc_storage::StorageError),
    #[error("spawning worker process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("worker exited with status {0}")]
    WorkerCrashed(i32),
    #[error("worker timed out")]
    Timeout,
    #[error("decoding worker response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("storing work item output: {0}")]
    OutputStore(#[source] orc_storage::StorageError),
    #[error("worker reported an error: {0}")]
    WorkerReportedError(String),
}
