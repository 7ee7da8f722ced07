// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `NodeRegistry` (SPEC_FULL §4.3): the in-memory fleet view. Heartbeats
//! arriving on the bus are applied as upserts; a periodic reconcile pass
//! folds in the authoritative mutable-name snapshot so a replica that
//! missed bus traffic still converges. Reads always go through
//! `StateGateway`, never the remote store directly (§4.3 "bound latency").

use std::sync::Arc;

use orc_adapters::BusAdapter;
use orc_core::{Clock, NodeLoad};
use orc_storage::{Event, StateGateway};
use orc_wire::{EnvelopeBody, Topic};

use crate::env;

pub struct NodeRegistry<C: Clock> {
    gateway: Arc<StateGateway>,
    bus: Arc<dyn BusAdapter>,
    clock: C,
}

impl<C: Clock + 'static> NodeRegistry<C> {
    pub fn new(gateway: Arc<StateGateway>, bus: Arc<dyn BusAdapter>, clock: C) -> Self {
        Self { gateway, bus, clock }
    }

    /// Apply one heartbeat envelope as a fleet upsert. Non-heartbeat bodies
    /// are ignored; callers typically feed this from a `recv` loop on
    /// `Topic::NodesHeartbeat`.
    pub fn apply_envelope(&self, body: EnvelopeBody, sequence: u64) {
        if let EnvelopeBody::NodeHeartbeat {
            node_id,
            endpoint,
            capabilities,
            load,
        } = body
        {
            self.upsert(node_id, endpoint, capabilities, load, sequence);
        }
    }

    fn upsert(
        &self,
        node_id: orc_core::NodeId,
        endpoint: smol_str::SmolStr,
        capabilities: Vec<smol_str::SmolStr>,
        load: NodeLoad,
        sequence: u64,
    ) {
        if let Err(err) = self.gateway.apply(Event::NodeHeartbeatReceived {
            node_id,
            endpoint,
            capabilities,
            load,
            sequence,
        }) {
            tracing::error!(error = %err, "failed to persist node heartbeat");
        }
    }

    /// Runs the bus subscription loop until the bus closes or lags past
    /// recovery.
    pub async fn run_heartbeat_listener(&self) {
        loop {
            match self.bus.recv(Topic::NodesHeartbeat).await {
                Ok(envelope) => self.apply_envelope(envelope.body, envelope.sequence),
                Err(orc_adapters::BusError::Closed) => return,
                Err(err) => tracing::warn!(error = %err, "heartbeat listener lagged, continuing"),
            }
        }
    }

    /// Folds the authoritative mutable-name snapshot into the local view
    /// for any node this replica hasn't itself heard a newer heartbeat
    /// from (SPEC_FULL §4.3 "periodically reconciles").
    pub async fn reconcile(&self) {
        let remote = match self.gateway.fetch_fleet_snapshot().await {
            Ok(Some(remote)) => remote,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(error = %err, "fleet snapshot reconcile failed");
                return;
            }
        };
        let stale_ids: Vec<_> = {
            let state = self.gateway.read();
            remote
                .into_iter()
                .filter(|(id, record)| {
                    state
                        .nodes
                        .get(id.as_str())
                        .map_or(true, |local| local.last_sequence < record.last_sequence)
                })
                .map(|(_, record)| record)
                .collect()
        };
        for record in stale_ids {
            self.upsert(
                record.id,
                record.endpoint,
                record.capabilities.into_iter().collect(),
                record.load,
                record.last_sequence,
            );
        }
    }

    /// Runs the staleness sweep (SPEC_FULL §4.3: stale after `3H`, evicted
    /// after `10H`) and publishes the refreshed fleet view.
    pub async fn sweep_and_publish(&self) {
        self.gateway
            .sweep_stale_nodes(self.clock.now(), env::heartbeat_interval());
        if let Err(err) = self.gateway.publish_fleet_snapshot().await {
            tracing::warn!(error = %err, "failed to publish fleet snapshot");
        }
    }

    /// Spawns the periodic reconcile + staleness-sweep loop (default every
    /// heartbeat interval, SPEC_FULL §4.3).
    pub fn spawn_reconcile_loop(self: Arc<Self>) -> tokio::task::JoinHandle<()>
    where
        C: Send + Sync,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(env::heartbeat_interval());
            loop {
                ticker.tick().await;
                self.reconcile().await;
                self.sweep_and_publish().await;
            }
        })
    }
}

#[cfg(test)]
#[path = "node_registry_tests.rs"]
mod tests;
