// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The topic broadcast bus (spec §6.1): publish/subscribe on a fixed set of
//! topics, payloads ignoring unknown fields. `InMemoryBus` is the adapter
//! this workspace ships; a real multi-host deployment swaps in a client for
//! whatever message bus it actually runs (Kafka, NATS, ...) behind the same
//! trait (see DESIGN.md).

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::broadcast;

use orc_wire::{Envelope, Topic};

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("no subscribers for topic {0}")]
    NoSubscribers(&'static str),
    #[error("subscriber lagged and dropped {0} messages")]
    Lagged(u64),
    #[error("bus closed")]
    Closed,
}

#[async_trait]
pub trait BusAdapter: Send + Sync + 'static {
    async fn publish(&self, topic: Topic, envelope: Envelope) -> Result<(), BusError>;
    async fn recv(&self, topic: Topic) -> Result<Envelope, BusError>;
    fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Envelope>;
}

const CHANNEL_CAPACITY: usize = 1024;

/// A single-process bus backed by one `tokio::sync::broadcast` channel per
/// topic. Publishing when nobody is subscribed is not an error — the spec
/// treats a missed publication as something the control plane tolerates
/// (§4.10 "missed publications do not alter local behavior").
pub struct InMemoryBus {
    channels: Mutex<HashMap<&'static str, broadcast::Sender<Envelope>>>,
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn sender_for(&self, topic: Topic) -> broadcast::Sender<Envelope> {
        self.channels
            .lock()
            .entry(topic.as_str())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl BusAdapter for InMemoryBus {
    async fn publish(&self, topic: Topic, envelope: Envelope) -> Result<(), BusError> {
        // A send with zero receivers returns Err but is not a fault: the
        // topic simply has no current listener.
        let _ = self.sender_for(topic).send(envelope);
        Ok(())
    }

    async fn recv(&self, topic: Topic) -> Result<Envelope, BusError> {
        let mut receiver = self.sender_for(topic).subscribe();
        match receiver.recv().await {
            Ok(envelope) => Ok(envelope),
            Err(broadcast::error::RecvError::Lagged(n)) => Err(BusError::Lagged(n)),
            Err(broadcast::error::RecvError::Closed) => Err(BusError::Closed),
        }
    }

    fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Envelope> {
        self.sender_for(topic).subscribe()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
