// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn fresh_record_stays_active() {
    let now = Instant::now();
    let mut record = NodeRecord::new("n0", "http://n0:9000", now);
    record.apply_staleness(now, Duration::from_secs(10));
    assert_eq!(record.status, NodeStatus::Active);
}

#[test]
fn silence_past_3h_marks_stale() {
    let h = Duration::from_secs(10);
    let start = Instant::now();
    let mut record = NodeRecord::new("n0", "http://n0:9000", start);
    let later = start + h * 3 + Duration::from_millis(1);
    record.apply_staleness(later, h);
    assert_eq!(record.status, NodeStatus::Stale);
}

#[test]
fn silence_past_10h_marks_evicted() {
    let h = Duration::from_secs(10);
    let start = Instant::now();
    let mut record = NodeRecord::new("n0", "http://n0:9000", start);
    let later = start + h * 10 + Duration::from_millis(1);
    record.apply_staleness(later, h);
    assert_eq!(record.status, NodeStatus::Evicted);
}

#[test]
fn stale_is_never_selectable() {
    assert!(!NodeStatus::Stale.is_selectable());
    assert!(!NodeStatus::Evicted.is_selectable());
    assert!(NodeStatus::Active.is_selectable());
}

#[test]
fn load_fraction_is_active_over_capacity() {
    let load = NodeLoad { active_jobs: 3, declared_capacity: 4, ..Default::default() };
    assert_eq!(load.load_fraction(), 0.75);
}

#[test]
fn load_fraction_saturates_when_capacity_is_zero() {
    let load = NodeLoad { active_jobs: 0, declared_capacity: 0, ..Default::default() };
    assert_eq!(load.load_fraction(), 1.0);
}
