// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RateLimiter` (SPEC_FULL §6.1): fixed-window, per-owner-per-minute
//! admission gate enforcing the `rate_limits` TOML section ahead of
//! `JobManager::submit`. Same shape as `ResourceAccountant` — one
//! `parking_lot::Mutex`-guarded map, never held across an `.await`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use smol_str::SmolStr;

use orc_core::Priority;

use crate::env::RateLimits;

const WINDOW: Duration = Duration::from_secs(60);

struct Window {
    started_at: Instant,
    count: u32,
}

pub struct RateLimiter {
    limits: RateLimits,
    windows: Mutex<HashMap<SmolStr, Window>>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn limit_for(&self, priority: Priority) -> u32 {
        match priority {
            Priority::High => self.limits.high,
            Priority::Normal => self.limits.normal,
            Priority::Low => self.limits.low,
        }
    }

    /// Admits one submission for `owner` at `priority`, or denies it once
    /// that priority's per-minute token budget is spent for the current
    /// window. `now` is caller-supplied so tests can drive it deterministically.
    pub fn try_admit(&self, owner: &str, priority: Priority, now: Instant) -> bool {
        let limit = self.limit_for(priority);
        let mut windows = self.windows.lock();
        let window = windows.entry(SmolStr::new(owner)).or_insert_with(|| Window { started_at: now, count: 0 });

        if now.saturating_duration_since(window.started_at) >= WINDOW {
            window.started_at = now;
            window.count = 0;
        }
        if window.count >= limit {
            return false;
        }
        window.count += 1;
        true
    }
}

#[cfg(test)]
#[path = "rate_limiter_tests.rs"]
mod tests;
