// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator↔node transport (spec §6.1): the `PatternExecutor` hands a
//! `WorkItem` to a node and gets back a `PartialResult`, over the same
//! length-prefixed wire format as the bus envelope.

use async_trait::async_trait;
use tokio::net::TcpStream;

use orc_core::{PartialResult, WorkItem};
use orc_wire::ProtocolError;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect to node failed: {0}")]
    Connect(#[source] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

#[async_trait]
pub trait NodeTransport: Send + Sync + 'static {
    async fn dispatch(&self, endpoint: &str, work: WorkItem) -> Result<PartialResult, TransportError>;
}

/// Dispatches a `WorkItem` to a node daemon over a plain TCP connection
/// using the shared length-prefixed JSON framing, one connection per call.
/// The node daemon's `JobQueue` listener is the peer (`orc-node`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpNodeTransport;

#[async_trait]
impl NodeTransport for TcpNodeTransport {
    async fn dispatch(&self, endpoint: &str, work: WorkItem) -> Result<PartialResult, TransportError> {
        let mut stream = TcpStream::connect(endpoint)
            .await
            .map_err(TransportError::Connect)?;
        orc_wire::write_frame(&mut stream, &work).await?;
        let result: PartialResult = orc_wire::read_frame(&mut stream).await?;
        Ok(result)
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
