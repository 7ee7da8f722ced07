// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn fan_out(nodes: usize) -> JobSpec {
    JobSpec::FanOut(FanOutSpec {
        model: ModelId::new("m1"),
        nodes: (0..nodes).map(|i| NodeId::new(format!("n{i}"))).collect(),
        data: DataSelector::new("sel"),
        aggregation: AggregationKind::Mean,
        privacy: None,
        minimum_reputation: 0.0,
        timeout: Duration::from_secs(60),
    })
}

#[test]
fn fan_out_requires_at_least_two_nodes() {
    assert!(!fan_out(1).structurally_valid());
    assert!(fan_out(2).structurally_valid());
}

#[test]
fn consensus_requires_at_least_two_models() {
    let spec = JobSpec::Consensus(ConsensusSpec {
        models: vec![ModelId::new("m1")],
        node: NodeId::new("n0"),
        data: DataSelector::new("sel"),
        consensus: ConsensusKind::Majority,
        minimum_agreement: 0.5,
        timeout: Duration::from_secs(30),
        model_weights: None,
    });
    assert!(!spec.structurally_valid());
}

#[test]
fn pipeline_requires_at_least_two_steps() {
    let step = PipelineStep {
        index: 0,
        model: ModelId::new("m1"),
        node: NodeId::new("n0"),
        input_from_step: None,
        data: Some(DataSelector::new("sel")),
        timeout: Duration::from_secs(10),
    };
    let spec = JobSpec::Pipeline(PipelineSpec {
        steps: vec![step],
        failure_policy: StepFailurePolicy::FailFast,
        retry_limit: 0,
    });
    assert!(!spec.structurally_valid());
}

#[test]
fn privacy_params_default_sensitivity_is_one() {
    let json = r#"{"epsilon": 2.0}"#;
    let params: PrivacyParams = serde_json::from_str(json).expect("deserialize");
    assert_eq!(params.sensitivity, 1.0);
    assert_eq!(params.laplace_scale(), 0.5);
}

#[test]
fn referenced_nodes_covers_every_pattern() {
    assert_eq!(fan_out(3).referenced_nodes().len(), 3);
}
