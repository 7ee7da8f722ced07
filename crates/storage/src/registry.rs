// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mutable-name registry (spec §6.1): a tiny key → current-blob-handle
//! map used for exactly two records, `fleet-registry` and `active-jobs`.
//! Readers tolerate staleness up to twice the configured refresh interval;
//! this crate just provides the get/put primitive, refresh scheduling lives
//! in `orc-control`'s `NodeRegistry`/`PeerCoordinator`.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::Mutex;

use crate::blob::{BlobHandle, StorageError};

pub const FLEET_REGISTRY_NAME: &str = "fleet-registry";
pub const ACTIVE_JOBS_NAME: &str = "active-jobs";

#[async_trait]
pub trait MutableNameRegistry: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<BlobHandle>, StorageError>;
    async fn put(&self, name: &str, handle: BlobHandle) -> Result<(), StorageError>;
}

/// A registry backed by a single JSON file, guarded by an OS file lock so
/// multiple orchestrator replica processes on the same host don't race each
/// other's read-modify-write (same pattern as the daemon's single-instance
/// lock, applied per-write instead of for the whole process lifetime).
pub struct FsNameRegistry {
    path: PathBuf,
    // Short-held in-process lock; the OS file lock handles cross-process
    // exclusion for the read-modify-write below.
    guard: Mutex<()>,
}

impl FsNameRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<HashMap<String, BlobHandle>, StorageError> {
        let mut file = match OpenOptions::new().read(true).open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => return Err(err.into()),
        };
        file.lock_shared()?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        file.unlock()?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn store(&self, entries: &HashMap<String, BlobHandle>) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.path)?;
        file.lock_exclusive()?;
        let body = serde_json::to_vec_pretty(entries)?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&body)?;
        file.flush()?;
        file.unlock()?;
        Ok(())
    }
}

#[async_trait]
impl MutableNameRegistry for FsNameRegistry {
    async fn get(&self, name: &str) -> Result<Option<BlobHandle>, StorageError> {
        let _guard = self.guard.lock();
        Ok(self.load()?.get(name).cloned())
    }

    async fn put(&self, name: &str, handle: BlobHandle) -> Result<(), StorageError> {
        let _guard = self.guard.lock();
        let mut entries = self.load()?;
        entries.insert(name.to_string(), handle);
        self.store(&entries)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
