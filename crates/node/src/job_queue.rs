// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `JobQueue` (spec §4.6): a priority queue keyed by `(priority,
//! enqueue-time ascending)`, admitting iff `ResourceAccountant` has
//! headroom. A single dispatcher task pops the highest-priority ready item;
//! the caller reserves resources, starts a worker, and releases on exit.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;

use orc_core::{Priority, WorkItem};

use crate::error::ResourceError;
use crate::resource_accountant::{ResourceAccountant, ResourceRequest};

struct Entry {
    priority: Priority,
    sequence: Reverse<u64>,
    work: WorkItem,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    /// `BinaryHeap` is a max-heap; ties within a priority tier break toward
    /// the *earlier* enqueue time, hence the `Reverse` on `sequence`.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.priority, self.sequence).cmp(&(other.priority, other.sequence))
    }
}

/// Node-local priority admission queue (spec §4.6). Owns no resources
/// itself — admission is checked against a caller-supplied
/// `ResourceAccountant` at enqueue time.
pub struct JobQueue {
    heap: Mutex<BinaryHeap<Entry>>,
    notify: Notify,
    next_sequence: AtomicU64,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            notify: Notify::new(),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Admits `work` iff `accountant` currently has headroom for one more
    /// worker's footprint; otherwise the caller (the orchestrator's
    /// `PatternExecutor`, via `NodeTransport`) must treat `Denied` as
    /// backpressure and try another node, not as a failure (spec §4.6).
    pub fn enqueue(
        &self,
        work: WorkItem,
        priority: Priority,
        accountant: &ResourceAccountant,
        footprint: ResourceRequest,
    ) -> Result<(), ResourceError> {
        if !accountant.has_headroom(&footprint) {
            return Err(ResourceError::Denied);
        }
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.heap.lock().push(Entry {
            priority,
            sequence: Reverse(sequence),
            work,
        });
        self.notify.notify_one();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn try_pop(&self) -> Option<WorkItem> {
        self.heap.lock().pop().map(|entry| entry.work)
    }

    /// Waits for and returns the highest-priority ready item. The single
    /// dispatcher task (spec §5 "single dispatcher task to keep admission
    /// order deterministic") is the only caller.
    pub async fn pop(&self) -> WorkItem {
        loop {
            if let Some(work) = self.try_pop() {
                return work;
            }
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
#[path = "job_queue_tests.rs"]
mod tests;
