// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn display_matches_snake_case_kind() {
    assert_eq!(SpecErrorKind::BadSpec.to_string(), "bad_spec");
    assert_eq!(FusionErrorKind::QuorumLost.to_string(), "quorum_lost");
    assert_eq!(
        ControlPlaneErrorKind::HandoffRejected.to_string(),
        "handoff_rejected"
    );
}

#[test]
fn pipeline_error_kind_carries_step() {
    let err = PipelineErrorKind { step: 2 };
    assert_eq!(err.to_string(), "step_failed(step=2)");
}

#[test]
fn error_kind_round_trips_through_json() {
    let err = ErrorKind::Fusion(FusionErrorKind::NoConsensus);
    let json = serde_json::to_string(&err).expect("serialize");
    let back: ErrorKind = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(err, back);
}

#[test]
fn worker_crashed_display_ignores_exit_code() {
    let err = ExecutionErrorKind::WorkerCrashed { exit_code: 137 };
    assert_eq!(err.to_string(), "worker_crashed");
}
