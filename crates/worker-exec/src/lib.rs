// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! orc-worker-exec: the structured stdin/stdout handoff shared between
//! `orc-node`'s `WorkerSupervisor` and the isolated `orc-worker` process it
//! spawns (spec §4.9). Model inference itself is an opaque "load and
//! invoke" capability (spec §1) — this crate only owns the request/response
//! envelope and the worker binary's process-local side of it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use orc_core::spec::ModelId;

/// Written by the supervisor to a temp file and piped into the worker's
/// stdin (spec §4.9 "structured handoff").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub model_id: ModelId,
    /// Local filesystem path of the cached model artifact (populated by
    /// `ModelCache::acquire` before the worker is spawned).
    pub model_path: PathBuf,
    pub input_bytes: Vec<u8>,
}

/// Written by the worker to stdout; the supervisor reads it back into a
/// temp file before converting it to a `PartialOutcome`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub outcome: WorkerOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkerOutcome {
    Ok(Vec<u8>),
    Err(String),
}

/// The opaque "load and invoke" step (spec §1 non-goal: no real matrix
/// kernels or GPU bindings here). Deterministic so tests can assert on it:
/// the output is a digest of the model bytes and the input bytes, standing
/// in for whatever a real runtime would actually compute.
pub fn invoke(model_bytes: &[u8], input_bytes: &[u8]) -> Vec<u8> {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(model_bytes);
    hasher.update(input_bytes);
    hasher.finalize().to_vec()
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
