use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use orc_core::{JobId, NodeId, Priority};
use orc_storage::{BlobStore, FsBlobStore, FsNameRegistry};

use crate::listener::ReplyRegistry;
use crate::model_cache::ModelCache;
use crate::resource_accountant::ResourceAccountant;

fn script(dir: &std::path::Path, body: &str) -> PathBuf {
    let path = dir.join("worker.sh");
    std::fs::write(&path, format!("#!/bin/sh\ncat >/dev/null\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn footprint() -> ResourceRequest {
    ResourceRequest {
        cpu_fraction: 1.0,
        memory_bytes: 1,
        accelerator_slots: 0,
    }
}

async fn seeded(body: &str) -> (tempfile::TempDir, Arc<Dispatcher>, Arc<JobQueue>, Arc<ReplyRegistry>, Arc<ResourceAccountant>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let blob_store = Arc::new(FsBlobStore::new(dir.path().join("blobs"))) as Arc<dyn BlobStore>;
    let model_bytes_handle = blob_store.put(b"model-bytes").await.expect("put model");
    let model_cache = Arc::new(ModelCache::new(blob_store.clone(), dir.path().join("models"), 1 << 20));
    let accountant = Arc::new(ResourceAccountant::new(4.0, 1 << 30, 0, 4));
    let worker_path = script(dir.path(), body);
    let supervisor = Arc::new(WorkerSupervisor::new(
        blob_store.clone(),
        model_cache,
        accountant.clone(),
        worker_path,
        Duration::from_millis(100),
    ));

    let model_registry = Arc::new(FsNameRegistry::new(dir.path().join("models.json"))) as Arc<dyn MutableNameRegistry>;
    model_registry.put("m1", model_bytes_handle).await.expect("register model");

    let queue = Arc::new(JobQueue::new());
    let replies = Arc::new(ReplyRegistry::new());
    let dispatcher = Arc::new(Dispatcher::new(queue.clone(), supervisor, model_registry, replies.clone(), footprint()));
    (dir, dispatcher, queue, replies, accountant)
}

fn work() -> WorkItem {
    WorkItem::new(
        JobId::new(),
        NodeId::from("node-1"),
        "m1".into(),
        "ignored-input-handle",
        Duration::from_secs(30),
        Instant::now(),
    )
}

#[tokio::test]
async fn step_resolves_the_model_and_delivers_a_successful_result() {
    let (_dir, dispatcher, queue, replies, accountant) = seeded(r#"printf '{"outcome":{"Ok":[9]}}'"#).await;
    let item = work();
    let id = item.id;
    // Mirrors what Listener::handle_connection does: register before enqueue.
    let receiver_placeholder = replies.register(id);
    queue.enqueue(item, Priority::Normal, &accountant, footprint()).expect("enqueue");

    dispatcher.step().await;

    let result = receiver_placeholder.await.expect("result delivered");
    assert!(result.is_ok());
}
