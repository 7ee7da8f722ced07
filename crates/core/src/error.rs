// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared across the control and execution tiers.
//!
//! These are *kinds*, not the `thiserror` enums each crate defines for its
//! own fallible operations — a crate-local error converts into one of these
//! when it needs to cross into a `Job`'s terminal state or a client-facing
//! response. See spec §7.

use serde::{Deserialize, Serialize};

/// Errors that can surface at job submission, before any work is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecErrorKind {
    BadSpec,
    InsufficientNodes,
}

crate::simple_display! {
    SpecErrorKind {
        BadSpec => "bad_spec",
        InsufficientNodes => "insufficient_nodes",
    }
}

/// Errors raised while handing a `WorkItem` to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchErrorKind {
    Backpressure,
    NodeUnavailable,
}

crate::simple_display! {
    DispatchErrorKind {
        Backpressure => "backpressure",
        NodeUnavailable => "node_unavailable",
    }
}

/// Errors raised while a worker executes a dispatched `WorkItem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionErrorKind {
    Timeout,
    WorkerCrashed { exit_code: i32 },
    ResourceDenied,
    ModelFetchFailed,
}

crate::simple_display! {
    ExecutionErrorKind {
        Timeout => "timeout",
        WorkerCrashed(..) => "worker_crashed",
        ResourceDenied => "resource_denied",
        ModelFetchFailed => "model_fetch_failed",
    }
}

/// Errors raised while fusing or combining partial results into one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionErrorKind {
    QuorumLost,
    NoConsensus,
    ReviewRequired,
}

crate::simple_display! {
    FusionErrorKind {
        QuorumLost => "quorum_lost",
        NoConsensus => "no_consensus",
        ReviewRequired => "review_required",
    }
}

/// Errors raised mid-pipeline, after retries (if any) are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineErrorKind {
    pub step: u32,
}

impl std::fmt::Display for PipelineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step_failed(step={})", self.step)
    }
}

/// Errors raised by the control plane itself (registry, peer coordination).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPlaneErrorKind {
    RegistryStale,
    PeerTimeout,
    HandoffRejected,
}

crate::simple_display! {
    ControlPlaneErrorKind {
        RegistryStale => "registry_stale",
        PeerTimeout => "peer_timeout",
        HandoffRejected => "handoff_rejected",
    }
}

/// The top-level error kind attached to a `Failed` job (spec §7, "a failed
/// job surfaces a single top-level error kind").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ErrorKind {
    Spec(SpecErrorKind),
    Dispatch(DispatchErrorKind),
    Execution(ExecutionErrorKind),
    Fusion(FusionErrorKind),
    Pipeline(PipelineErrorKind),
    ControlPlane(ControlPlaneErrorKind),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Spec(k) => write!(f, "{k}"),
            ErrorKind::Dispatch(k) => write!(f, "{k}"),
            ErrorKind::Execution(k) => write!(f, "{k}"),
            ErrorKind::Fusion(k) => write!(f, "{k}"),
            ErrorKind::Pipeline(k) => write!(f, "{k}"),
            ErrorKind::ControlPlane(k) => write!(f, "{k}"),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
