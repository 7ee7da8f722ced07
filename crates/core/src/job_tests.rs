// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::{ErrorKind, FusionErrorKind};
use crate::fusion::AggregationKind;
use crate::spec::{FanOutSpec, JobSpec};
use std::time::Duration;

fn spec() -> JobSpec {
    JobSpec::FanOut(FanOutSpec {
        model: "m1".into(),
        nodes: vec!["a".into(), "b".into()],
        data: "sel".into(),
        aggregation: AggregationKind::Mean,
        privacy: None,
        minimum_reputation: 0.0,
        timeout: Duration::from_secs(30),
    })
}

#[test]
fn new_job_starts_pending() {
    let job = Job::builder(spec()).build();
    assert_eq!(job.state, JobState::Pending);
}

#[test]
fn pending_to_running_is_legal() {
    let mut job = Job::builder(spec()).build();
    assert!(job.transition(JobState::Running));
    assert_eq!(job.state, JobState::Running);
}

#[test]
fn pending_to_completed_is_illegal() {
    let mut job = Job::builder(spec()).build();
    assert!(!job.transition(JobState::Completed { result: "h1".into() }));
    assert_eq!(job.state, JobState::Pending);
}

#[test]
fn terminal_states_never_transition_again() {
    let mut job = Job::builder(spec()).build();
    assert!(job.transition(JobState::Running));
    assert!(job.transition(JobState::Failed {
        kind: FailureKind(ErrorKind::Fusion(FusionErrorKind::QuorumLost))
    }));
    assert!(job.state.is_terminal());
    assert!(!job.transition(JobState::Cancelled));
    assert!(!job.transition(JobState::Running));
}

#[test]
fn cancel_is_legal_from_any_non_terminal_state() {
    let mut pending = Job::builder(spec()).build();
    assert!(pending.transition(JobState::Cancelled));

    let mut running = Job::builder(spec()).build();
    assert!(running.transition(JobState::Running));
    assert!(running.transition(JobState::Cancelled));
}

#[test]
fn already_terminal_rejects_cancel() {
    let mut job = Job::builder(spec()).build();
    assert!(job.transition(JobState::Cancelled));
    assert!(!job.transition(JobState::Cancelled));
}
