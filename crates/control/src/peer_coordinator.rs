// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PeerCoordinator` (SPEC_FULL §4.5): tracks sibling replicas via
//! `orchestrator.heartbeat` and offers load-aware handoff of locally-owned
//! jobs when this replica is saturated and a peer isn't. Same
//! apply/upsert/reconcile shape as `NodeRegistry`, one tier up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use smol_str::SmolStr;

use orc_adapters::BusAdapter;
use orc_core::{Clock, JobId};
use orc_storage::{Event, StateGateway};
use orc_wire::{Envelope, EnvelopeBody, Topic};

use crate::env;

/// Local saturation threshold past which this replica starts looking for a
/// handoff target (SPEC_FULL §4.5).
const HANDOFF_LOAD_THRESHOLD: f64 = 0.8;
/// A peer is only offered a job if its own load is below this fraction.
const HANDOFF_PEER_MAX_LOAD: f64 = 0.5;

pub struct PeerCoordinator<C: Clock> {
    gateway: Arc<StateGateway>,
    bus: Arc<dyn BusAdapter>,
    clock: C,
    replica_id: SmolStr,
    sequence: AtomicU64,
}

impl<C: Clock + 'static> PeerCoordinator<C> {
    pub fn new(gateway: Arc<StateGateway>, bus: Arc<dyn BusAdapter>, clock: C, replica_id: impl Into<SmolStr>) -> Self {
        Self {
            gateway,
            bus,
            clock,
            replica_id: replica_id.into(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Apply one heartbeat envelope as a peer-view upsert. Bodies other
    /// than `OrchestratorHeartbeat` are ignored; callers typically feed
    /// this from a `recv` loop on `Topic::OrchestratorHeartbeat`.
    pub fn apply_envelope(&self, body: EnvelopeBody, sequence: u64) {
        if let EnvelopeBody::OrchestratorHeartbeat {
            orchestrator_id,
            endpoint,
            active_job_count,
            capacity,
        } = body
        {
            if orchestrator_id == self.replica_id {
                return;
            }
            if let Err(err) = self.gateway.apply(Event::PeerHeartbeatReceived {
                peer_id: orchestrator_id,
                endpoint,
                active_job_count,
                capacity,
                sequence,
            }) {
                tracing::error!(error = %err, "failed to persist peer heartbeat");
            }
        }
    }

    /// Runs the bus subscription loop until the bus closes or lags past
    /// recovery.
    pub async fn run_heartbeat_listener(&self) {
        loop {
            match self.bus.recv(Topic::OrchestratorHeartbeat).await {
                Ok(envelope) => self.apply_envelope(envelope.body, envelope.sequence),
                Err(orc_adapters::BusError::Closed) => return,
                Err(err) => tracing::warn!(error = %err, "orchestrator heartbeat listener lagged, continuing"),
            }
        }
    }

    /// Publishes this replica's own heartbeat (SPEC_FULL §4.5, §6.1).
    /// `active_job_count` is supplied by the caller since only `JobManager`
    /// knows the locally-owned job count.
    pub async fn publish_heartbeat(&self, active_job_count: u32) {
        let envelope = self.envelope(EnvelopeBody::OrchestratorHeartbeat {
            orchestrator_id: self.replica_id.clone(),
            endpoint: env::replica_endpoint(),
            active_job_count,
            capacity: env::replica_capacity(),
        });
        if let Err(err) = self.bus.publish(Topic::OrchestratorHeartbeat, envelope).await {
            tracing::warn!(error = %err, "failed to publish orchestrator heartbeat");
        }
    }

    /// If locally saturated, offers `job_id` to the least-loaded peer below
    /// `HANDOFF_PEER_MAX_LOAD` (SPEC_FULL §4.5). Returns `true` if an offer
    /// was published.
    pub async fn maybe_offer_handoff(&self, job_id: JobId, local_active_job_count: u32) -> bool {
        let local_load = f64::from(local_active_job_count) / f64::from(env::replica_capacity().max(1));
        if local_load <= HANDOFF_LOAD_THRESHOLD {
            return false;
        }
        let now = self.clock.now();
        let target = {
            let state = self.gateway.read();
            state
                .peers
                .values()
                .filter(|peer| !peer.is_stale(now, env::heartbeat_interval()))
                .filter(|peer| peer.load_fraction() < HANDOFF_PEER_MAX_LOAD)
                .min_by(|a, b| a.load_fraction().total_cmp(&b.load_fraction()))
                .map(|peer| peer.id.clone())
        };
        let Some(_target) = target else {
            return false;
        };
        let envelope = self.envelope(EnvelopeBody::HandoffOffer {
            job_id,
            from: self.replica_id.clone(),
        });
        if let Err(err) = self.bus.publish(Topic::OrchestratorHandoff, envelope).await {
            tracing::warn!(error = %err, "failed to publish handoff offer");
            return false;
        }
        true
    }

    /// Applies a `HandoffAccept` received for a job this replica still
    /// owns, transferring ownership (SPEC_FULL §4.5 "first peer to accept
    /// takes ownership"). No-op if this replica no longer owns the job
    /// (another accept already won).
    pub fn apply_handoff_accept(&self, job_id: JobId, by: orc_core::OrchestratorId) {
        let still_owned = self
            .gateway
            .read()
            .owner_of(&job_id)
            .is_some_and(|owner| owner == self.replica_id.as_str());
        if !still_owned {
            return;
        }
        if let Err(err) = self.gateway.apply(Event::JobOwnerChanged { job_id, new_owner: by }) {
            tracing::error!(job = %job_id, error = %err, "failed to persist handoff ownership change");
        }
    }

    /// Runs the handoff-accept listener until the bus closes.
    pub async fn run_handoff_listener(&self) {
        loop {
            match self.bus.recv(Topic::OrchestratorHandoff).await {
                Ok(envelope) => {
                    if let EnvelopeBody::HandoffAccept { job_id, by } = envelope.body {
                        self.apply_handoff_accept(job_id, by);
                    }
                }
                Err(orc_adapters::BusError::Closed) => return,
                Err(err) => tracing::warn!(error = %err, "handoff listener lagged, continuing"),
            }
        }
    }

    fn envelope(&self, body: EnvelopeBody) -> Envelope {
        Envelope {
            kind: SmolStr::new("event"),
            sender_id: self.replica_id.clone(),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            timestamp: chrono::Utc::now(),
            body,
        }
    }

    /// Spawns the periodic heartbeat-publish loop.
    pub fn spawn_heartbeat_loop(self: Arc<Self>, active_job_count: impl Fn() -> u32 + Send + Sync + 'static) -> tokio::task::JoinHandle<()>
    where
        C: Send + Sync,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(env::heartbeat_interval());
            loop {
                ticker.tick().await;
                self.publish_heartbeat(active_job_count()).await;
            }
        })
    }
}

#[cfg(test)]
#[path = "peer_coordinator_tests.rs"]
mod tests;
