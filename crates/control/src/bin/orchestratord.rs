// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc-orchestratord`: the control-plane binary. Wires `StateGateway`,
//! `JobManager`, `NodeRegistry`, and `PeerCoordinator` together behind an
//! HTTP client job API (SPEC_FULL §6).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;

use orc_adapters::{BusAdapter, InMemoryBus, NodeTransport, TcpNodeTransport};
use orc_control::{env, JobManager, JobManagerError, NodeRegistry, NodeSelector, PatternExecutor, PeerCoordinator};
use orc_core::error::SpecErrorKind;
use orc_core::{JobId, SystemClock};
use orc_storage::{FsBlobStore, FsNameRegistry, StateGateway};
use orc_wire::{CancelOutcome, GetResultResponse, GetStatusResponse, SubmitJobRequest, SubmitJobResponse};
use serde::Serialize;

struct AppState {
    job_manager: Arc<JobManager<SystemClock>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "orchestratord exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), orc_storage::StorageError> {
    let config = env::load_toml_config().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to load config file, falling back to defaults");
        env::TomlConfig::default()
    });

    let blobs = Arc::new(FsBlobStore::new(env::blob_root()));
    let names = Arc::new(FsNameRegistry::new(env::registry_path()));
    let gateway = Arc::new(StateGateway::open(env::wal_path(), blobs, names)?);

    let bus = Arc::new(InMemoryBus::new()) as Arc<dyn BusAdapter>;
    let transport = Arc::new(TcpNodeTransport) as Arc<dyn NodeTransport>;
    let replica_id = env::replica_id();

    let executor = Arc::new(PatternExecutor::new(
        gateway.clone(),
        bus.clone(),
        transport,
        NodeSelector::default(),
        SystemClock,
        replica_id.clone(),
    ));
    let job_manager = Arc::new(JobManager::with_rate_limits(
        gateway.clone(),
        executor,
        SystemClock,
        replica_id.clone(),
        config.rate_limits,
    ));

    let node_registry = Arc::new(NodeRegistry::new(gateway.clone(), bus.clone(), SystemClock));
    let peer_coordinator = Arc::new(PeerCoordinator::new(gateway.clone(), bus.clone(), SystemClock, replica_id));

    tokio::spawn({
        let registry = node_registry.clone();
        async move { registry.run_heartbeat_listener().await }
    });
    tokio::spawn({
        let coordinator = peer_coordinator.clone();
        async move { coordinator.run_heartbeat_listener().await }
    });
    tokio::spawn({
        let coordinator = peer_coordinator.clone();
        async move { coordinator.run_handoff_listener().await }
    });
    node_registry.spawn_reconcile_loop();
    job_manager.clone().spawn_sweep_loop();
    peer_coordinator.spawn_heartbeat_loop(|| 0);

    let state = Arc::new(AppState { job_manager });
    let app = Router::new()
        .route("/jobs", post(submit_job))
        .route("/jobs/:job_id", get(get_status))
        .route("/jobs/:job_id/result", get(get_result))
        .route("/jobs/:job_id", axum::routing::delete(cancel_job))
        .with_state(state);

    let addr = env::http_bind_addr();
    tracing::info!(%addr, "orchestratord listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(orc_storage::StorageError::Io)?;
    axum::serve(listener, app).await.map_err(orc_storage::StorageError::Io)?;
    Ok(())
}

async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitJobRequest>,
) -> Result<Json<SubmitJobResponse>, (StatusCode, Json<ErrorResponse>)> {
    let job_id = state
        .job_manager
        .submit(request.spec, "client", request.priority, request.cost_ceiling)
        .map_err(job_manager_error_response)?;
    Ok(Json(SubmitJobResponse {
        job_id,
        state: "pending".into(),
        estimated_completion: None,
    }))
}

async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<JobId>,
) -> Result<Json<GetStatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    state.job_manager.status(job_id).map(Json).ok_or_else(not_found)
}

async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<JobId>,
) -> Result<Json<GetResultResponse>, (StatusCode, Json<ErrorResponse>)> {
    state.job_manager.result(job_id).map(Json).ok_or_else(not_found)
}

async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<JobId>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.job_manager.cancel(job_id) {
        CancelOutcome::Ack => Ok(StatusCode::OK),
        CancelOutcome::NotFound => Err(not_found()),
        CancelOutcome::AlreadyTerminal => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "already_terminal".to_string(),
            }),
        )),
    }
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not_found".to_string(),
        }),
    )
}

fn job_manager_error_response(err: JobManagerError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        JobManagerError::BadSpec(SpecErrorKind::BadSpec) => StatusCode::BAD_REQUEST,
        JobManagerError::BadSpec(SpecErrorKind::InsufficientNodes) => StatusCode::SERVICE_UNAVAILABLE,
        JobManagerError::NotFound(_) => StatusCode::NOT_FOUND,
        JobManagerError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        JobManagerError::Storage(_) | JobManagerError::Bus(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}
