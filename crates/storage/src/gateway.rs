// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StateGateway` — the only component that talks to the blob store and
//! the mutable-name registry (spec §2). Everything else (NodeRegistry,
//! JobManager, PeerCoordinator) reads/writes through this.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::blob::{BlobHandle, BlobStore, StorageError};
use crate::events::Event;
use crate::registry::{MutableNameRegistry, ACTIVE_JOBS_NAME, FLEET_REGISTRY_NAME};
use crate::state::MaterializedState;
use crate::wal::Wal;

/// Current snapshot schema version this binary writes and expects to read
/// without migration. `orc-storage::migration` bridges older snapshots up
/// to this.
pub const SNAPSHOT_VERSION: u32 = 1;

pub struct StateGateway {
    wal: parking_lot::Mutex<Wal>,
    state: RwLock<MaterializedState>,
    blobs: Arc<dyn BlobStore>,
    names: Arc<dyn MutableNameRegistry>,
}

impl StateGateway {
    /// Open the gateway against a local WAL file, replaying any events
    /// already on disk into a fresh `MaterializedState` (SPEC_FULL §2.2).
    pub fn open(
        wal_path: impl Into<PathBuf>,
        blobs: Arc<dyn BlobStore>,
        names: Arc<dyn MutableNameRegistry>,
    ) -> Result<Self, StorageError> {
        let mut wal = Wal::open(wal_path.into(), 0)?;
        let mut state = MaterializedState::default();
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply_event(&entry.event);
            wal.mark_processed(entry.seq)?;
        }
        Ok(Self {
            wal: parking_lot::Mutex::new(wal),
            state: RwLock::new(state),
            blobs,
            names,
        })
    }

    /// Append `event` to the log and fold it into the in-memory view. The
    /// write-ahead log is the only persistence authority (spec §6.1); the
    /// in-memory view is always reconstructible by replay alone.
    pub fn apply(&self, event: Event) -> Result<(), StorageError> {
        {
            let mut wal = self.wal.lock();
            let seq = wal.append(&event)?;
            wal.flush()?;
            wal.mark_processed(seq)?;
        }
        self.state.write().apply_event(&event);
        Ok(())
    }

    /// A read-only snapshot of the current materialized view. Callers that
    /// need a consistent multi-field read should clone what they need out
    /// of the guard rather than holding it across an `.await`.
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, MaterializedState> {
        self.state.read()
    }

    pub fn sweep_stale_nodes(&self, now: Instant, heartbeat_interval: Duration) {
        self.state.write().sweep_stale_nodes(now, heartbeat_interval);
    }

    pub fn sweep_expired_jobs(&self, now: Instant, ttl: Duration) -> Vec<orc_core::JobId> {
        self.state.write().sweep_expired_jobs(now, ttl)
    }

    pub async fn put_blob(&self, bytes: &[u8]) -> Result<BlobHandle, StorageError> {
        self.blobs.put(bytes).await
    }

    pub async fn get_blob(&self, handle: &BlobHandle) -> Result<Vec<u8>, StorageError> {
        self.blobs.get(handle).await
    }

    /// Publish the current fleet view to the mutable-name registry so other
    /// replicas can bound their own staleness (spec §6.1, tolerant to 2×
    /// the refresh interval).
    pub async fn publish_fleet_snapshot(&self) -> Result<(), StorageError> {
        let snapshot = serde_json::to_vec(&self.state.read().nodes)?;
        let handle = self.blobs.put(&snapshot).await?;
        self.names.put(FLEET_REGISTRY_NAME, handle).await
    }

    pub async fn publish_active_jobs_snapshot(&self) -> Result<(), StorageError> {
        let snapshot = serde_json::to_vec(&self.state.read().job_owners)?;
        let handle = self.blobs.put(&snapshot).await?;
        self.names.put(ACTIVE_JOBS_NAME, handle).await
    }

    /// Fetch the current fleet-registry snapshot published by whichever
    /// replica wrote it last (SPEC_FULL §6.1 "readers tolerate any
    /// staleness up to 2x the refresh interval"). `None` if nothing has
    /// been published yet.
    pub async fn fetch_fleet_snapshot(&self) -> Result<Option<std::collections::HashMap<String, orc_core::NodeRecord>>, StorageError> {
        let Some(handle) = self.names.get(FLEET_REGISTRY_NAME).await? else {
            return Ok(None);
        };
        let bytes = self.blobs.get(&handle).await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Fetch the current active-jobs ownership snapshot (same staleness
    /// tolerance as `fetch_fleet_snapshot`).
    pub async fn fetch_active_jobs_snapshot(&self) -> Result<Option<std::collections::HashMap<String, String>>, StorageError> {
        let Some(handle) = self.names.get(ACTIVE_JOBS_NAME).await? else {
            return Ok(None);
        };
        let bytes = self.blobs.get(&handle).await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
