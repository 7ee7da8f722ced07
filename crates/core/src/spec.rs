// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable job specifications for the three execution patterns
//! (spec §3, §4.2).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::fusion::{AggregationKind, ConsensusKind};
use crate::node::NodeId;

/// A model identifier, as declared in a job spec and resolved by the
/// `ModelCache` on the node that executes it.
pub type ModelId = SmolStr;

/// Opaque reference to input data a `WorkItem` should operate on, resolved
/// by the node daemon against the blob store or a client-supplied handle.
pub type DataSelector = SmolStr;

/// One of the three job patterns this system executes (spec §2, §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum JobSpec {
    FanOut(FanOutSpec),
    Consensus(ConsensusSpec),
    Pipeline(PipelineSpec),
}

impl JobSpec {
    pub fn pattern_name(&self) -> &'static str {
        match self {
            JobSpec::FanOut(_) => "fan_out",
            JobSpec::Consensus(_) => "consensus",
            JobSpec::Pipeline(_) => "pipeline",
        }
    }

    /// The global wall-clock deadline for the whole job, derived from the
    /// spec's own timeout field.
    pub fn timeout(&self) -> Duration {
        match self {
            JobSpec::FanOut(s) => s.timeout,
            JobSpec::Consensus(s) => s.timeout,
            JobSpec::Pipeline(s) => s.steps.iter().map(|s| s.timeout).sum(),
        }
    }

    /// Structural validity, independent of registry state (spec §4.1
    /// `BadSpec` conditions that don't require a live fleet view).
    pub fn structurally_valid(&self) -> bool {
        match self {
            JobSpec::FanOut(s) => s.nodes.len() >= 2,
            JobSpec::Consensus(s) => s.models.len() >= 2,
            JobSpec::Pipeline(s) => s.steps.len() >= 2,
        }
    }

    /// Every node id this spec references, for registry validation at submit.
    pub fn referenced_nodes(&self) -> Vec<NodeId> {
        match self {
            JobSpec::FanOut(s) => s.nodes.clone(),
            JobSpec::Consensus(s) => vec![s.node.clone()],
            JobSpec::Pipeline(s) => s.steps.iter().map(|step| step.node.clone()).collect(),
        }
    }

    pub fn minimum_reputation(&self) -> Option<f64> {
        match self {
            JobSpec::FanOut(s) => Some(s.minimum_reputation),
            JobSpec::Consensus(_) | JobSpec::Pipeline(_) => None,
        }
    }
}

/// Optional differential-privacy parameters applied post-fusion (spec §4.2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PrivacyParams {
    pub epsilon: f64,
    /// Sensitivity of the aggregated statistic. Defaults to `1.0` when the
    /// spec omits it (SPEC_FULL §9 open question resolution).
    #[serde(default = "PrivacyParams::default_sensitivity")]
    pub sensitivity: f64,
}

impl PrivacyParams {
    fn default_sensitivity() -> f64 {
        1.0
    }

    pub fn laplace_scale(&self) -> f64 {
        self.sensitivity / self.epsilon
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanOutSpec {
    pub model: ModelId,
    pub nodes: Vec<NodeId>,
    pub data: DataSelector,
    pub aggregation: AggregationKind,
    #[serde(default)]
    pub privacy: Option<PrivacyParams>,
    #[serde(default)]
    pub minimum_reputation: f64,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusSpec {
    pub models: Vec<ModelId>,
    pub node: NodeId,
    pub data: DataSelector,
    pub consensus: ConsensusKind,
    pub minimum_agreement: f64,
    pub timeout: Duration,
    /// Per-model weights for `weighted` consensus, parallel to `models`.
    /// `None` weights every present vote equally (SPEC_FULL §9 resolves
    /// the spec's silence on where "per-model reputation" comes from,
    /// since reputation otherwise lives on `NodeRecord`, not a model id).
    #[serde(default)]
    pub model_weights: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepFailurePolicy {
    RollbackAndRetry,
    FailFast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub index: u32,
    pub model: ModelId,
    pub node: NodeId,
    /// `None` means "use the client-supplied input"; `Some(n)` means "use
    /// step n's output" (spec: input reference "client" or "step-N").
    pub input_from_step: Option<u32>,
    /// The client-supplied input, required when `input_from_step` is
    /// `None` and ignored otherwise (SPEC_FULL §9 resolves the spec's
    /// "client" input reference to a concrete selector, mirroring
    /// `FanOutSpec`/`ConsensusSpec::data`).
    #[serde(default)]
    pub data: Option<DataSelector>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub steps: Vec<PipelineStep>,
    pub failure_policy: StepFailurePolicy,
    pub retry_limit: u32,
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
