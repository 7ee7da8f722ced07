// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The node daemon's receiving end of `orc_adapters::TcpNodeTransport`
//! (spec §6.1): one TCP connection per dispatched `WorkItem`. Accepted work
//! is handed to the `JobQueue`; the connection blocks for its `PartialResult`
//! via a one-shot registry keyed by `WorkItemId`, filled in by `Dispatcher`.
//!
//! On denial (`ResourceError::Denied`) the connection is closed without a
//! reply. The orchestrator's transport then surfaces a protocol error,
//! which its caller must treat as "try another node" per spec §4.6 —
//! enforced at that call site, not here.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use orc_core::{PartialResult, Priority, WorkItem, WorkItemId};

use crate::job_queue::JobQueue;
use crate::resource_accountant::{ResourceAccountant, ResourceRequest};

/// Pairs an in-flight `WorkItemId` with the connection awaiting its result.
/// An entry missing on `complete` means the waiting connection already gave
/// up (closed, or the listener removed it on denial) — not itself an error.
#[derive(Default)]
pub struct ReplyRegistry {
    pending: Mutex<HashMap<WorkItemId, oneshot::Sender<PartialResult>>>,
}

impl ReplyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, id: WorkItemId) -> oneshot::Receiver<PartialResult> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        rx
    }

    fn cancel(&self, id: &WorkItemId) {
        self.pending.lock().remove(id);
    }

    /// Called by `Dispatcher` once a `WorkItem`'s result is ready.
    pub fn complete(&self, result: PartialResult) {
        if let Some(tx) = self.pending.lock().remove(&result.work_item_id) {
            let _ = tx.send(result);
        }
    }
}

pub struct Listener {
    queue: Arc<JobQueue>,
    accountant: Arc<ResourceAccountant>,
    replies: Arc<ReplyRegistry>,
    footprint: ResourceRequest,
}

impl Listener {
    pub fn new(
        queue: Arc<JobQueue>,
        accountant: Arc<ResourceAccountant>,
        replies: Arc<ReplyRegistry>,
        footprint: ResourceRequest,
    ) -> Self {
        Self {
            queue,
            accountant,
            replies,
            footprint,
        }
    }

    /// Accepts connections on an already-bound `listener` until `shutdown`
    /// fires. Binding is the caller's job (`noded::run` in production, an
    /// ephemeral `127.0.0.1:0` port in tests) so tests can discover the
    /// actual port before connecting.
    pub async fn serve(self: Arc<Self>, listener: TcpListener, shutdown: CancellationToken) -> std::io::Result<()> {
        tracing::info!(addr = ?listener.local_addr(), "node listener bound");
        loop {
            tokio::select! {
                () = shutdown.cancelled() => return Ok(()),
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    let this = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(err) = this.handle_connection(stream).await {
                            tracing::warn!(%peer, error = %err, "node connection ended with an error");
                        }
                    });
                }
            }
        }
    }

    async fn handle_connection(&self, mut stream: TcpStream) -> Result<(), orc_wire::ProtocolError> {
        let work: WorkItem = orc_wire::read_frame(&mut stream).await?;
        let id = work.id;
        let receiver = self.replies.register(id);

        // WorkItem carries no priority of its own (spec §3); the control
        // plane's own priority lives on the owning Job and is not yet
        // threaded through dispatch, so every item is admitted as Normal.
        if self
            .queue
            .enqueue(work, Priority::Normal, &self.accountant, self.footprint)
            .is_err()
        {
            self.replies.cancel(&id);
            return Ok(());
        }

        match receiver.await {
            Ok(result) => orc_wire::write_frame(&mut stream, &result).await,
            Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
