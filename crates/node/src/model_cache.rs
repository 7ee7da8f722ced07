// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ModelCache` (spec §4.8): a byte-budgeted LRU of model artifacts backed
//! by the content-addressed blob store, with single-flight fetch coalescing
//! (SPEC_FULL §2.2: `tokio::sync::Notify` + an in-flight map guarded by a
//! `parking_lot::Mutex`, never held across an `.await`).

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tokio::sync::Notify;

use orc_core::spec::ModelId;
use orc_storage::{BlobHandle, BlobStore, StorageError};

use crate::error::ModelCacheError;

struct CacheEntry {
    path: PathBuf,
    size_bytes: u64,
    refcount: u32,
}

struct State {
    entries: LruCache<ModelId, CacheEntry>,
    used_bytes: u64,
    in_flight: HashMap<ModelId, Arc<Notify>>,
}

/// A live reference into the cache. `release` must be called exactly once
/// per handle; the cache does not implement `Drop`-based refcounting so the
/// release point stays explicit at the `WorkerSupervisor` call site.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    pub model_id: ModelId,
    pub path: PathBuf,
}

pub struct ModelCache {
    blob_store: Arc<dyn BlobStore>,
    models_dir: PathBuf,
    budget_bytes: u64,
    state: Mutex<State>,
}

impl ModelCache {
    pub fn new(blob_store: Arc<dyn BlobStore>, models_dir: impl Into<PathBuf>, budget_bytes: u64) -> Self {
        Self {
            blob_store,
            models_dir: models_dir.into(),
            budget_bytes,
            state: Mutex::new(State {
                // Bytes are the real budget; this bounds capacity only as a
                // safety backstop against runaway entry counts.
                entries: LruCache::new(NonZeroUsize::new(4096).unwrap_or(NonZeroUsize::MIN)),
                used_bytes: 0,
                in_flight: HashMap::new(),
            }),
        }
    }

    /// Returns a handle for `model_id`, fetching and inserting it on miss.
    /// Concurrent callers for the same `model_id` share one download.
    pub async fn acquire(&self, model_id: ModelId, handle: &BlobHandle) -> Result<ModelHandle, ModelCacheError> {
        loop {
            enum Step {
                Hit(PathBuf),
                Lead,
                Wait(Arc<Notify>),
            }
            let step = {
                let mut state = self.state.lock();
                if let Some(entry) = state.entries.get_mut(&model_id) {
                    entry.refcount += 1;
                    Step::Hit(entry.path.clone())
                } else if let Some(notify) = state.in_flight.get(&model_id) {
                    Step::Wait(notify.clone())
                } else {
                    state.in_flight.insert(model_id.clone(), Arc::new(Notify::new()));
                    Step::Lead
                }
            };
            match step {
                Step::Hit(path) => return Ok(ModelHandle { model_id, path }),
                Step::Wait(notify) => {
                    notify.notified().await;
                    continue;
                }
                Step::Lead => return self.fetch_and_insert(model_id, handle).await,
            }
        }
    }

    async fn fetch_and_insert(&self, model_id: ModelId, handle: &BlobHandle) -> Result<ModelHandle, ModelCacheError> {
        let result = self.download(&model_id, handle).await;

        let mut state = self.state.lock();
        let notify = state.in_flight.remove(&model_id);
        let outcome = match result {
            Ok((path, size_bytes)) => {
                Self::make_room(&mut state, self.budget_bytes, size_bytes).map(|()| {
                    state.entries.put(
                        model_id.clone(),
                        CacheEntry {
                            path: path.clone(),
                            size_bytes,
                            refcount: 1,
                        },
                    );
                    state.used_bytes += size_bytes;
                    ModelHandle { model_id: model_id.clone(), path }
                })
            }
            Err(err) => Err(err),
        };
        drop(state);
        if let Some(notify) = notify {
            notify.notify_waiters();
        }
        outcome
    }

    async fn download(&self, model_id: &ModelId, handle: &BlobHandle) -> Result<(PathBuf, u64), ModelCacheError> {
        let bytes = self.blob_store.get(handle).await.map_err(ModelCacheError::Fetch)?;
        let path = self.models_dir.join(format!("{model_id}-{handle}"));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::Io)
                .map_err(ModelCacheError::Fetch)?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(StorageError::Io)
            .map_err(ModelCacheError::Fetch)?;
        Ok((path, bytes.len() as u64))
    }

    /// Evicts LRU, zero-refcount entries until `incoming` fits the budget.
    /// `CacheFull` if no further entry is evictable (spec §4.8).
    fn make_room(state: &mut State, budget_bytes: u64, incoming: u64) -> Result<(), ModelCacheError> {
        while state.used_bytes + incoming > budget_bytes {
            let victim = state
                .entries
                .iter()
                .rev()
                .find(|(_, entry)| entry.refcount == 0)
                .map(|(id, _)| id.clone());
            let Some(victim) = victim else {
                return Err(ModelCacheError::CacheFull);
            };
            if let Some(entry) = state.entries.pop(&victim) {
                state.used_bytes = state.used_bytes.saturating_sub(entry.size_bytes);
            }
        }
        Ok(())
    }

    /// Decrements the reference count on `handle.model_id`. The entry
    /// becomes evictable (but stays cached) once the count reaches zero.
    pub fn release(&self, handle: ModelHandle) {
        let mut state = self.state.lock();
        if let Some(entry) = state.entries.peek_mut(&handle.model_id) {
            entry.refcount = entry.refcount.saturating_sub(1);
        }
    }

    pub fn used_bytes(&self) -> u64 {
        self.state.lock().used_bytes
    }

    pub fn contains(&self, model_id: &ModelId) -> bool {
        self.state.lock().entries.contains(model_id)
    }
}

#[cfg(test)]
#[path = "model_cache_tests.rs"]
mod tests;
