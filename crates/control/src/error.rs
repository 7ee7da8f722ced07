// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors `JobManager` and its collaborators can raise. These wrap the
//! shared `orc_core::ErrorKind` taxonomy (spec §7) plus the crate-local
//! faults (storage, bus) that can prevent an operation from completing.

use orc_core::error::SpecErrorKind;
use orc_core::JobId;

#[derive(Debug, thiserror::Error)]
pub enum JobManagerError {
    #[error("bad spec: {0}")]
    BadSpec(SpecErrorKind),
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("rate limit exceeded for this priority")]
    RateLimited,
    #[error("storage error: {0}")]
    Storage(#[from] orc_storage::StorageError),
    #[error("bus error: {0}")]
    Bus(#[from] orc_adapters::BusError),
}
