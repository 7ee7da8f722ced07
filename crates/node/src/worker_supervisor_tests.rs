use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use orc_core::{JobId, NodeId};
use orc_storage::FsBlobStore;

/// Writes an executable shell script to `dir` that prints `body` to stdout
/// and returns its path, standing in for the `orc-worker` binary.
fn script(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\ncat >/dev/null\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

struct Fixture {
    _dir: tempfile::TempDir,
    blob_store: Arc<dyn BlobStore>,
    model_cache: Arc<ModelCache>,
    accountant: Arc<ResourceAccountant>,
}

async fn fixture() -> (Fixture, BlobHandle, WorkItem) {
    let dir = tempfile::tempdir().expect("tempdir");
    let blob_store = Arc::new(FsBlobStore::new(dir.path().join("blobs"))) as Arc<dyn BlobStore>;
    let model_handle = blob_store.put(b"model-bytes").await.expect("put model");
    let model_cache = Arc::new(ModelCache::new(blob_store.clone(), dir.path().join("models"), 1 << 20));
    let accountant = Arc::new(ResourceAccountant::new(4.0, 1 << 30, 0, 4));

    let input_handle = blob_store.put(b"input-bytes").await.expect("put input");
    let work = WorkItem::new(
        JobId::new(),
        NodeId::from("node-1"),
        "m1".into(),
        input_handle.0.clone(),
        Duration::from_secs(30),
        Instant::now(),
    );

    (
        Fixture {
            _dir: dir,
            blob_store,
            model_cache,
            accountant,
        },
        model_handle,
        work,
    )
}

fn footprint() -> ResourceRequest {
    ResourceRequest {
        cpu_fraction: 1.0,
        memory_bytes: 1,
        accelerator_slots: 0,
    }
}

#[tokio::test]
async fn successful_run_stores_the_workers_output_and_releases_the_reservation() {
    let (fx, model_handle, work) = fixture().await;
    let worker_path = script(fx._dir.path(), "worker-ok.sh", r#"printf '{"outcome":{"Ok":[1,2,3]}}'"#);

    let supervisor = WorkerSupervisor::new(
        fx.blob_store.clone(),
        fx.model_cache.clone(),
        fx.accountant.clone(),
        worker_path,
        Duration::from_millis(100),
    );

    let result = supervisor.run(work, model_handle, footprint()).await;
    assert!(result.is_ok(), "expected Ok, got {:?}", result.outcome);
    assert_eq!(fx.accountant.active_workers(), 0);

    let PartialOutcome::Ok(output_handle) = result.outcome else {
        unreachable!("checked above");
    };
    let stored = fx
        .blob_store
        .get(&BlobHandle(output_handle.to_string()))
        .await
        .expect("output stored");
    assert_eq!(stored, vec![1, 2, 3]);
}

#[tokio::test]
async fn worker_reported_error_surfaces_as_model_fetch_failed() {
    let (fx, model_handle, work) = fixture().await;
    let worker_path = script(fx._dir.path(), "worker-err.sh", r#"printf '{"outcome":{"Err":"bad model"}}'"#);

    let supervisor = WorkerSupervisor::new(
        fx.blob_store.clone(),
        fx.model_cache.clone(),
        fx.accountant.clone(),
        worker_path,
        Duration::from_millis(100),
    );

    let result = supervisor.run(work, model_handle, footprint()).await;
    assert!(matches!(
        result.outcome,
        PartialOutcome::Err(ExecutionErrorKind::ModelFetchFailed)
    ));
    assert_eq!(fx.accountant.active_workers(), 0);
}

#[tokio::test]
async fn a_worker_that_outlives_its_deadline_is_reported_as_a_timeout() {
    let (fx, model_handle, work) = fixture().await;
    let worker_path = script(fx._dir.path(), "worker-slow.sh", "sleep 5");

    // Dispatch timeout comes from the work item's own deadline, not the
    // supervisor's kill grace period (that only bounds the post-timeout
    // SIGTERM->SIGKILL window), so give this one a short deadline.
    let work = WorkItem::new(
        work.job_id,
        work.node_id,
        work.model_id.clone(),
        work.inputs_handle.clone(),
        Duration::from_millis(50),
        Instant::now(),
    );

    let supervisor = WorkerSupervisor::new(
        fx.blob_store.clone(),
        fx.model_cache.clone(),
        fx.accountant.clone(),
        worker_path,
        Duration::from_millis(10),
    );

    let result = supervisor.run(work, model_handle, footprint()).await;
    assert!(matches!(result.outcome, PartialOutcome::Err(ExecutionErrorKind::Timeout)));
    assert_eq!(fx.accountant.active_workers(), 0);
}

#[tokio::test]
async fn resource_denial_short_circuits_before_any_process_is_spawned() {
    let (fx, model_handle, work) = fixture().await;
    let exhausted = Arc::new(ResourceAccountant::new(0.0, 1 << 30, 0, 4));

    let supervisor = WorkerSupervisor::new(
        fx.blob_store.clone(),
        fx.model_cache.clone(),
        exhausted,
        PathBuf::from("/nonexistent/orc-worker"),
        Duration::from_millis(100),
    );

    let result = supervisor.run(work, model_handle, footprint()).await;
    assert!(matches!(
        result.outcome,
        PartialOutcome::Err(ExecutionErrorKind::ResourceDenied)
    ));
}
