// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc-noded`: the per-node daemon binary. Wires `ResourceAccountant`,
//! `JobQueue`, `ModelCache`, `WorkerSupervisor`, `Dispatcher`, `Listener`,
//! and `HeartbeatEmitter` together; enforces a single running instance per
//! state directory and drains in-flight work on shutdown (SPEC_FULL §2.2).

use std::fs::OpenOptions;
use std::sync::Arc;

use fs2::FileExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use orc_adapters::{BusAdapter, InMemoryBus};
use orc_node::{Dispatcher, HeartbeatEmitter, JobQueue, Listener, ModelCache, ReplyRegistry, ResourceAccountant, ResourceRequest, WorkerSupervisor};
use orc_node::env;
use orc_storage::{FsBlobStore, FsNameRegistry, MutableNameRegistry};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "noded exited with an error");
        std::process::exit(1);
    }
}

/// Acquires an exclusive OS file lock on `env::lock_path()` for the
/// lifetime of this process, refusing to start a second instance against
/// the same state directory.
fn acquire_single_instance_lock() -> Result<std::fs::File, std::io::Error> {
    let path = env::lock_path();
    let file = OpenOptions::new().create(true).write(true).open(&path)?;
    file.try_lock_exclusive()?;
    Ok(file)
}

async fn run() -> Result<(), std::io::Error> {
    let _lock = acquire_single_instance_lock()?;

    let blobs = Arc::new(FsBlobStore::new(env::blob_root()));
    let model_registry = Arc::new(FsNameRegistry::new(env::model_registry_path())) as Arc<dyn MutableNameRegistry>;
    let bus = Arc::new(InMemoryBus::new()) as Arc<dyn BusAdapter>;

    let accountant = Arc::new(ResourceAccountant::new(
        env::cpu_budget(),
        env::memory_budget_bytes(),
        env::accelerator_slots(),
        env::max_concurrent_workers(),
    ));
    let model_cache = Arc::new(ModelCache::new(blobs.clone(), env::blob_root().join("models"), env::model_cache_byte_budget()));
    let supervisor = Arc::new(WorkerSupervisor::new(
        blobs,
        model_cache,
        accountant.clone(),
        env::worker_exec_path(),
        env::worker_kill_grace_period(),
    ));

    let footprint = ResourceRequest {
        cpu_fraction: env::per_worker_cpu_fraction(),
        memory_bytes: env::per_worker_memory_bytes(),
        accelerator_slots: env::per_worker_accelerator_slots(),
    };

    let queue = Arc::new(JobQueue::new());
    let replies = Arc::new(ReplyRegistry::new());
    let dispatcher = Arc::new(Dispatcher::new(queue.clone(), supervisor, model_registry, replies.clone(), footprint));
    tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.run().await }
    });

    let heartbeat = Arc::new(HeartbeatEmitter::new(
        bus,
        env::node_id(),
        env::node_endpoint(),
        env::capabilities(),
        accountant.clone(),
    ));
    heartbeat.spawn(env::heartbeat_interval(), env::max_concurrent_workers());

    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received, draining");
        shutdown_signal.cancel();
    });

    let listener = Arc::new(Listener::new(queue, accountant, replies, footprint));
    let tcp_listener = TcpListener::bind(env::bind_addr()).await?;
    tracing::info!(addr = env::bind_addr(), "orc-noded listening");

    listener.serve(tcp_listener, shutdown.clone()).await?;

    // Graceful drain: the listener has stopped accepting new connections;
    // give in-flight WorkerSupervisor runs up to drain_timeout to finish
    // before the process exits.
    tokio::time::sleep(env::drain_timeout()).await;
    Ok(())
}
