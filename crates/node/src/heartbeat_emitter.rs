// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HeartbeatEmitter` (spec §4.10): publishes `nodes.heartbeat` every H
//! carrying this node's id, endpoint, capabilities, current load, and a
//! monotonic sequence number. A missed publish does not alter local
//! behavior — the control plane infers staleness from silence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use smol_str::SmolStr;

use orc_adapters::BusAdapter;
use orc_core::{NodeId, NodeLoad};
use orc_wire::{Envelope, EnvelopeBody, Topic};

use crate::resource_accountant::ResourceAccountant;

pub struct HeartbeatEmitter {
    bus: Arc<dyn BusAdapter>,
    node_id: NodeId,
    endpoint: SmolStr,
    capabilities: Vec<SmolStr>,
    accountant: Arc<ResourceAccountant>,
    sequence: AtomicU64,
}

impl HeartbeatEmitter {
    pub fn new(
        bus: Arc<dyn BusAdapter>,
        node_id: NodeId,
        endpoint: impl Into<SmolStr>,
        capabilities: Vec<SmolStr>,
        accountant: Arc<ResourceAccountant>,
    ) -> Self {
        Self {
            bus,
            node_id,
            endpoint: endpoint.into(),
            capabilities,
            accountant,
            sequence: AtomicU64::new(0),
        }
    }

    /// Publishes one heartbeat with the next sequence number. `declared_capacity`
    /// is the node's configured worker budget; the rest of the load snapshot
    /// comes from the live `ResourceAccountant`.
    pub async fn publish_once(&self, declared_capacity: u32) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let load = NodeLoad {
            active_jobs: self.accountant.active_workers(),
            declared_capacity,
            reserved_cpu_fraction: self.accountant.cpu_reserved_fraction(),
            reserved_memory_fraction: self.accountant.memory_reserved_fraction(),
            reserved_slot_fraction: self.accountant.slot_reserved_fraction(),
        };
        let envelope = Envelope {
            kind: SmolStr::new("event"),
            sender_id: self.node_id.clone(),
            sequence,
            timestamp: chrono::Utc::now(),
            body: EnvelopeBody::NodeHeartbeat {
                node_id: self.node_id.clone(),
                endpoint: self.endpoint.clone(),
                capabilities: self.capabilities.clone(),
                load,
            },
        };
        if let Err(err) = self.bus.publish(Topic::NodesHeartbeat, envelope).await {
            tracing::warn!(error = %err, "failed to publish node heartbeat");
        }
    }

    /// Spawns the periodic publish loop; runs until the returned handle is
    /// aborted (node shutdown, spec §2.2 graceful drain).
    pub fn spawn(self: Arc<Self>, interval: Duration, declared_capacity: u32) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.publish_once(declared_capacity).await;
            }
        })
    }
}

#[cfg(test)]
#[path = "heartbeat_emitter_tests.rs"]
mod tests;
