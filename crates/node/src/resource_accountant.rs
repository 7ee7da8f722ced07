// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ResourceAccountant` (spec §4.7): pessimistic, atomic admission control
//! over three scalar budgets plus a concurrent-worker count. Mutation is
//! funnelled through one `parking_lot::Mutex`, never held across an
//! `.await` (spec §5 "shared-resource policy").

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::ResourceError;

/// What a single reservation costs (spec §4.7). `WorkItem` carries no
/// resource spec of its own, so callers build this from the node's
/// per-worker footprint (`env::per_worker_*`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceRequest {
    pub cpu_fraction: f64,
    pub memory_bytes: u64,
    pub accelerator_slots: u32,
}

/// An opaque proof of a successful reservation. Must be passed back to
/// `release` exactly once; dropping it without releasing leaks budget for
/// the lifetime of the accountant, same as forgetting to close a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationToken(u64);

struct Inner {
    cpu_budget: f64,
    cpu_used: f64,
    memory_budget: u64,
    memory_used: u64,
    accelerator_budget: u32,
    accelerator_used: u32,
    worker_budget: u32,
    workers: u32,
    next_token: u64,
    reservations: HashMap<u64, ResourceRequest>,
}

impl Inner {
    fn has_headroom(&self, req: &ResourceRequest) -> bool {
        self.cpu_used + req.cpu_fraction <= self.cpu_budget
            && self.memory_used + req.memory_bytes <= self.memory_budget
            && self.accelerator_used + req.accelerator_slots <= self.accelerator_budget
            && self.workers < self.worker_budget
    }
}

pub struct ResourceAccountant {
    inner: Mutex<Inner>,
}

impl ResourceAccountant {
    pub fn new(cpu_budget: f64, memory_budget: u64, accelerator_budget: u32, worker_budget: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                cpu_budget,
                cpu_used: 0.0,
                memory_budget,
                memory_used: 0,
                accelerator_budget,
                accelerator_used: 0,
                worker_budget,
                workers: 0,
                next_token: 0,
                reservations: HashMap::new(),
            }),
        }
    }

    /// Non-reserving headroom check (spec §4.6, `JobQueue::enqueue`'s
    /// admission test). Racy by design: a subsequent `try_reserve` may
    /// still be denied if another dispatch wins the reservation first.
    pub fn has_headroom(&self, req: &ResourceRequest) -> bool {
        self.inner.lock().has_headroom(req)
    }

    /// Atomically admits `req` or denies it; never partially reserves.
    pub fn try_reserve(&self, req: ResourceRequest) -> Result<ReservationToken, ResourceError> {
        let mut inner = self.inner.lock();
        if !inner.has_headroom(&req) {
            return Err(ResourceError::Denied);
        }
        inner.cpu_used += req.cpu_fraction;
        inner.memory_used += req.memory_bytes;
        inner.accelerator_used += req.accelerator_slots;
        inner.workers += 1;
        let token = inner.next_token;
        inner.next_token += 1;
        inner.reservations.insert(token, req);
        Ok(ReservationToken(token))
    }

    pub fn release(&self, token: ReservationToken) {
        let mut inner = self.inner.lock();
        let Some(req) = inner.reservations.remove(&token.0) else {
            tracing::warn!(token = token.0, "released an unknown or already-released reservation token");
            return;
        };
        inner.cpu_used = (inner.cpu_used - req.cpu_fraction).max(0.0);
        inner.memory_used = inner.memory_used.saturating_sub(req.memory_bytes);
        inner.accelerator_used = inner.accelerator_used.saturating_sub(req.accelerator_slots);
        inner.workers = inner.workers.saturating_sub(1);
    }

    /// Concurrent worker count, for `GetStatus`-style introspection.
    pub fn active_workers(&self) -> u32 {
        self.inner.lock().workers
    }

    /// Fraction of the CPU budget currently reserved, for heartbeat load
    /// reporting (spec §4.10). `0.0` if the budget itself is zero.
    pub fn cpu_reserved_fraction(&self) -> f64 {
        let inner = self.inner.lock();
        if inner.cpu_budget <= 0.0 {
            return 0.0;
        }
        (inner.cpu_used / inner.cpu_budget).min(1.0)
    }

    /// Fraction of the memory budget currently reserved.
    pub fn memory_reserved_fraction(&self) -> f64 {
        let inner = self.inner.lock();
        if inner.memory_budget == 0 {
            return 0.0;
        }
        (inner.memory_used as f64 / inner.memory_budget as f64).min(1.0)
    }

    /// Fraction of the worker-slot budget currently occupied.
    pub fn slot_reserved_fraction(&self) -> f64 {
        let inner = self.inner.lock();
        if inner.worker_budget == 0 {
            return 0.0;
        }
        (inner.workers as f64 / inner.worker_budget as f64).min(1.0)
    }
}

#[cfg(test)]
#[path = "resource_accountant_tests.rs"]
mod tests;
