// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the node-daemon crate
//! (SPEC_FULL §6.1 "resolved through a centralized env module per binary").

use std::path::PathBuf;
use std::time::Duration;

use smol_str::SmolStr;

/// Heartbeat interval H (spec §4.10). Shares a default with the control
/// crate's own `heartbeat_interval` but is resolved independently since
/// `orc-noded` and `orc-orchestratord` are separate processes.
pub fn heartbeat_interval() -> Duration {
    std::env::var("ORC_HEARTBEAT_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// This node's externally-visible id, published on every heartbeat.
pub fn node_id() -> SmolStr {
    std::env::var("ORC_NODE_ID")
        .ok()
        .map(SmolStr::from)
        .unwrap_or_else(|| SmolStr::new("node-1"))
}

/// This node's dispatch-accepting endpoint.
pub fn node_endpoint() -> SmolStr {
    std::env::var("ORC_NODE_ENDPOINT")
        .ok()
        .map(SmolStr::from)
        .unwrap_or_else(|| SmolStr::new("0.0.0.0:9000"))
}

/// Declared capability flags, comma-separated (e.g. `gpu,fp16`).
pub fn capabilities() -> Vec<SmolStr> {
    std::env::var("ORC_NODE_CAPABILITIES")
        .ok()
        .map(|raw| raw.split(',').filter(|s| !s.is_empty()).map(SmolStr::from).collect())
        .unwrap_or_default()
}

/// TCP bind address for the dispatch listener (spec §4.9 worker ingress).
pub fn bind_addr() -> String {
    std::env::var("ORC_NODE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".to_string())
}

/// Declared CPU budget, as a fraction (e.g. `4.0` for four cores).
pub fn cpu_budget() -> f64 {
    std::env::var("ORC_CPU_BUDGET")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(4.0)
}

/// Declared memory budget in bytes.
pub fn memory_budget_bytes() -> u64 {
    std::env::var("ORC_MEMORY_BUDGET_BYTES")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(8 * 1024 * 1024 * 1024)
}

/// Declared accelerator slot count (e.g. GPUs).
pub fn accelerator_slots() -> u32 {
    std::env::var("ORC_ACCELERATOR_SLOTS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Maximum concurrent workers regardless of scalar headroom.
pub fn max_concurrent_workers() -> u32 {
    std::env::var("ORC_MAX_CONCURRENT_WORKERS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(8)
}

/// Per-dispatched-work-item resource footprint. `WorkItem` carries no
/// resource spec of its own (spec §3), so admission is checked against this
/// fixed per-worker cost.
pub fn per_worker_cpu_fraction() -> f64 {
    std::env::var("ORC_WORKER_CPU_FRACTION")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(1.0)
}

pub fn per_worker_memory_bytes() -> u64 {
    std::env::var("ORC_WORKER_MEMORY_BYTES")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(512 * 1024 * 1024)
}

pub fn per_worker_accelerator_slots() -> u32 {
    std::env::var("ORC_WORKER_ACCELERATOR_SLOTS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Byte budget for the model LRU cache (spec §4.8).
pub fn model_cache_byte_budget() -> u64 {
    std::env::var("ORC_MODEL_CACHE_BYTES")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(4 * 1024 * 1024 * 1024)
}

/// Default worker wall-clock timeout (spec §4.9, default 120s).
pub fn worker_timeout_default() -> Duration {
    std::env::var("ORC_WORKER_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(120))
}

/// Grace period between `SIGTERM` and `SIGKILL` (spec §4.9).
pub fn worker_kill_grace_period() -> Duration {
    std::env::var("ORC_WORKER_KILL_GRACE_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(5))
}

/// Path to the `orc-worker` binary the supervisor spawns per work item.
pub fn worker_exec_path() -> PathBuf {
    std::env::var("ORC_WORKER_EXEC_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("orc-worker"))
}

/// Local content-addressed blob store root, shared with model artifacts
/// and work-item input/output payloads.
pub fn blob_root() -> PathBuf {
    std::env::var("ORC_BLOB_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./orc-blobs"))
}

/// Local mutable-name registry mapping model id to its current blob handle
/// (spec §6.1 mutable-name registry, reused here for model resolution).
pub fn model_registry_path() -> PathBuf {
    std::env::var("ORC_MODEL_REGISTRY_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./orc-models.json"))
}

/// Single-instance lock file for this node daemon's state directory
/// (SPEC_FULL §2.2).
pub fn lock_path() -> PathBuf {
    std::env::var("ORC_NODE_LOCK_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./orc-noded.lock"))
}

/// Graceful-shutdown drain timeout (SPEC_FULL §2.2).
pub fn drain_timeout() -> Duration {
    std::env::var("ORC_DRAIN_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30))
}
