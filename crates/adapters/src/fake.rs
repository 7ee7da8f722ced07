// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test doubles for `NodeTransport`, mirroring the teacher codebase's
//! `notify::fake` module shape: a recording fake behind `Arc<Mutex<_>>`,
//! gated behind `test-support` so other crates can depend on it too.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use orc_core::{PartialResult, WorkItem};

use crate::transport::{NodeTransport, TransportError};

#[derive(Debug, Clone)]
pub struct DispatchCall {
    pub endpoint: String,
    pub work: WorkItem,
}

/// A `NodeTransport` that returns pre-seeded responses in FIFO order and
/// records every call it receives, for `PatternExecutor` unit tests that
/// don't want a real socket.
#[derive(Clone, Default)]
pub struct FakeNodeTransport {
    calls: Arc<Mutex<Vec<DispatchCall>>>,
    responses: Arc<Mutex<VecDeque<Result<PartialResult, String>>>>,
}

impl FakeNodeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, result: PartialResult) {
        self.responses.lock().push_back(Ok(result));
    }

    pub fn push_err(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl NodeTransport for FakeNodeTransport {
    async fn dispatch(&self, endpoint: &str, work: WorkItem) -> Result<PartialResult, TransportError> {
        self.calls.lock().push(DispatchCall {
            endpoint: endpoint.to_string(),
            work: work.clone(),
        });
        match self.responses.lock().pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(TransportError::Connect(std::io::Error::new(
                std::io::ErrorKind::Other,
                message,
            ))),
            None => Err(TransportError::Connect(std::io::Error::new(
                std::io::ErrorKind::Other,
                "FakeNodeTransport exhausted",
            ))),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
