// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test harness: a real `StateGateway` backed by a temp directory,
//! plus small seeding helpers. Used across `pattern_executor`, `job_manager`,
//! `node_registry`, and `peer_coordinator` test modules.

use std::sync::Arc;

use orc_core::node::NodeLoad;
use orc_core::{Clock, JobId, JobSpec, Priority, SystemClock};
use orc_storage::{Event, FsBlobStore, FsNameRegistry, StateGateway};
use tempfile::TempDir;

pub fn gateway() -> (TempDir, Arc<StateGateway>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let wal_path = dir.path().join("wal.log");
    let blobs = Arc::new(FsBlobStore::new(dir.path().join("blobs")));
    let names = Arc::new(FsNameRegistry::new(dir.path().join("registry.json")));
    let gateway = Arc::new(StateGateway::open(wal_path, blobs, names).expect("open gateway"));
    (dir, gateway)
}

pub fn submit_job(gateway: &StateGateway, spec: JobSpec) -> JobId {
    let job_id = JobId::new();
    gateway
        .apply(Event::JobSubmitted {
            job_id,
            spec,
            owner: "owner".into(),
            priority: Priority::Normal,
            cost_ceiling: None,
            owner_replica: "r1".into(),
            submitted_at_epoch_ms: SystemClock.epoch_ms(),
        })
        .expect("apply JobSubmitted");
    job_id
}

pub fn register_node(gateway: &StateGateway, id: &str, endpoint: &str) {
    gateway
        .apply(Event::NodeHeartbeatReceived {
            node_id: id.into(),
            endpoint: endpoint.into(),
            capabilities: vec![],
            load: NodeLoad::default(),
            sequence: 1,
        })
        .expect("apply NodeHeartbeatReceived");
}
