// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The content-addressed blob store (spec §6.1): `put(bytes) -> handle`,
//! `get(handle) -> bytes`. Job specs, model artifacts, and result payloads
//! are all stored this way; this crate ships one concrete adapter
//! (`FsBlobStore`) and leaves HTTP/remote variants to `orc-adapters`.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("blob not found: {0}")]
    NotFound(BlobHandle),
    #[error("name not found in registry: {0}")]
    NameNotFound(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A content hash, hex-encoded. Immutable once minted: the same bytes
/// always produce the same handle (spec §6.1 "content-addressed; immutable").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobHandle(pub String);

impl BlobHandle {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bytes: &[u8]) -> Result<BlobHandle, StorageError>;
    async fn get(&self, handle: &BlobHandle) -> Result<Vec<u8>, StorageError>;
}

/// A blob store backed by a two-level directory layout under `root`,
/// keyed by the blob's own content hash.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, handle: &BlobHandle) -> PathBuf {
        let (prefix, rest) = handle.0.split_at(2.min(handle.0.len()));
        self.root.join(prefix).join(rest)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, bytes: &[u8]) -> Result<BlobHandle, StorageError> {
        let handle = BlobHandle::of(bytes);
        let path = self.path_for(&handle);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !tokio::fs::try_exists(&path).await? {
            tokio::fs::write(&path, bytes).await?;
        }
        Ok(handle)
    }

    async fn get(&self, handle: &BlobHandle) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(handle);
        tokio::fs::read(&path)
            .await
            .map_err(|_| StorageError::NotFound(handle.clone()))
    }
}

#[cfg(test)]
#[path = "blob_tests.rs"]
mod tests;
