// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-disk job spec format submitted via `orc submit`: HCL with the
//! same shape as `orc_core::spec::JobSpec`, but with `timeout` written as a
//! human duration literal (`"30s"`) instead of a raw `{secs, nanos}` pair.

use std::path::Path;

use serde::Deserialize;

use orc_core::fusion::{AggregationKind, ConsensusKind};
use orc_core::job::Priority;
use orc_core::node::NodeId;
use orc_core::spec::{
    ConsensusSpec, DataSelector, FanOutSpec, JobSpec, ModelId, PipelineSpec, PipelineStep, PrivacyParams,
    StepFailurePolicy,
};
use orc_wire::SubmitJobRequest;

use crate::duration;
use crate::error::SpecFmtError;

#[derive(Debug, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
enum SpecBody {
    FanOut(FanOutDocument),
    Consensus(ConsensusDocument),
    Pipeline(PipelineDocument),
}

#[derive(Debug, Deserialize)]
struct FanOutDocument {
    model: ModelId,
    nodes: Vec<NodeId>,
    data: DataSelector,
    aggregation: AggregationKind,
    #[serde(default)]
    privacy: Option<PrivacyParams>,
    #[serde(default)]
    minimum_reputation: f64,
    timeout: String,
}

#[derive(Debug, Deserialize)]
struct ConsensusDocument {
    models: Vec<ModelId>,
    node: NodeId,
    data: DataSelector,
    consensus: ConsensusKind,
    minimum_agreement: f64,
    timeout: String,
    #[serde(default)]
    model_weights: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct PipelineStepDocument {
    index: u32,
    model: ModelId,
    node: NodeId,
    #[serde(default)]
    input_from_step: Option<u32>,
    #[serde(default)]
    data: Option<DataSelector>,
    timeout: String,
}

#[derive(Debug, Deserialize)]
struct PipelineDocument {
    steps: Vec<PipelineStepDocument>,
    failure_policy: StepFailurePolicy,
    #[serde(default)]
    retry_limit: u32,
}

impl SpecBody {
    fn into_job_spec(self) -> Result<JobSpec, SpecFmtError> {
        Ok(match self {
            SpecBody::FanOut(doc) => JobSpec::FanOut(FanOutSpec {
                model: doc.model,
                nodes: doc.nodes,
                data: doc.data,
                aggregation: doc.aggregation,
                privacy: doc.privacy,
                minimum_reputation: doc.minimum_reputation,
                timeout: duration::parse(&doc.timeout)?,
            }),
            SpecBody::Consensus(doc) => JobSpec::Consensus(ConsensusSpec {
                models: doc.models,
                node: doc.node,
                data: doc.data,
                consensus: doc.consensus,
                minimum_agreement: doc.minimum_agreement,
                timeout: duration::parse(&doc.timeout)?,
                model_weights: doc.model_weights,
            }),
            SpecBody::Pipeline(doc) => {
                let mut steps = Vec::with_capacity(doc.steps.len());
                for step in doc.steps {
                    steps.push(PipelineStep {
                        index: step.index,
                        model: step.model,
                        node: step.node,
                        input_from_step: step.input_from_step,
                        data: step.data,
                        timeout: duration::parse(&step.timeout)?,
                    });
                }
                JobSpec::Pipeline(PipelineSpec {
                    steps,
                    failure_policy: doc.failure_policy,
                    retry_limit: doc.retry_limit,
                })
            }
        })
    }
}

/// A parsed spec file, ready to become a `SubmitJobRequest`.
#[derive(Debug, Deserialize)]
pub struct SpecDocument {
    #[serde(flatten)]
    body: SpecBody,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    cost_ceiling: Option<f64>,
}

impl SpecDocument {
    pub fn into_request(self) -> Result<SubmitJobRequest, SpecFmtError> {
        Ok(SubmitJobRequest {
            spec: self.body.into_job_spec()?,
            priority: self.priority,
            cost_ceiling: self.cost_ceiling,
        })
    }
}

pub fn parse_str(text: &str) -> Result<SpecDocument, SpecFmtError> {
    hcl::from_str(text).map_err(SpecFmtError::Hcl)
}

pub fn parse_file(path: &Path) -> Result<SpecDocument, SpecFmtError> {
    let text = std::fs::read_to_string(path).map_err(|source| SpecFmtError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_str(&text)
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
