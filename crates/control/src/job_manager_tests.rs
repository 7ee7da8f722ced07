use super::*;
use crate::node_selector::NodeSelector;
use crate::test_support::{gateway, register_node};
use orc_adapters::fake::FakeNodeTransport;
use orc_adapters::{BusAdapter, InMemoryBus};
use orc_core::{AggregationKind, FakeClock, FanOutSpec};
use serial_test::serial;
use std::time::Duration;

fn manager() -> (tempfile::TempDir, JobManager<FakeClock>) {
    let (dir, gateway) = gateway();
    let executor = Arc::new(PatternExecutor::new(
        gateway.clone(),
        Arc::new(InMemoryBus::new()) as Arc<dyn BusAdapter>,
        Arc::new(FakeNodeTransport::new()) as Arc<dyn orc_adapters::NodeTransport>,
        NodeSelector::default(),
        FakeClock::new(),
        "r1",
    ));
    (dir, JobManager::new(gateway, executor, FakeClock::new(), "r1"))
}

fn fan_out_spec(nodes: &[&str]) -> JobSpec {
    JobSpec::FanOut(FanOutSpec {
        model: "m1".into(),
        nodes: nodes.iter().map(|n| (*n).into()).collect(),
        data: "sel".into(),
        aggregation: AggregationKind::Mean,
        privacy: None,
        minimum_reputation: 0.0,
        timeout: Duration::from_secs(30),
    })
}

#[tokio::test]
async fn submit_rejects_a_structurally_invalid_spec() {
    let (_dir, manager) = manager();
    let err = manager
        .submit(fan_out_spec(&["a"]), "owner", Priority::Normal, None)
        .unwrap_err();
    assert!(matches!(err, JobManagerError::BadSpec(SpecErrorKind::BadSpec)));
}

#[tokio::test]
async fn submit_rejects_an_inactive_referenced_node() {
    let (_dir, manager) = manager();
    register_node(&manager.gateway, "a", "a:9000");
    let err = manager
        .submit(fan_out_spec(&["a", "b"]), "owner", Priority::Normal, None)
        .unwrap_err();
    assert!(matches!(err, JobManagerError::BadSpec(SpecErrorKind::BadSpec)));
}

#[tokio::test]
async fn submit_accepts_a_valid_spec_and_starts_pending() {
    let (_dir, manager) = manager();
    register_node(&manager.gateway, "a", "a:9000");
    register_node(&manager.gateway, "b", "b:9000");

    let job_id = manager
        .submit(fan_out_spec(&["a", "b"]), "owner", Priority::Normal, None)
        .expect("submit");
    let status = manager.status(job_id).expect("status present");
    assert_eq!(status.pattern.as_str(), "fan_out");
}

#[tokio::test]
#[serial]
async fn submit_rejects_when_cost_estimate_exceeds_ceiling_slack() {
    let (_dir, manager) = manager();
    register_node(&manager.gateway, "a", "a:9000");
    register_node(&manager.gateway, "b", "b:9000");

    std::env::set_var("ORC_COST_UNIT", "100");
    std::env::set_var("ORC_COST_SLACK_FACTOR", "1.0");
    let err = manager.submit(fan_out_spec(&["a", "b"]), "owner", Priority::Normal, Some(1.0));
    std::env::remove_var("ORC_COST_UNIT");
    std::env::remove_var("ORC_COST_SLACK_FACTOR");
    assert!(matches!(
        err.unwrap_err(),
        JobManagerError::BadSpec(SpecErrorKind::BadSpec)
    ));
}

#[tokio::test]
async fn submit_rejects_once_the_per_priority_rate_limit_is_spent() {
    let (_dir, gateway) = gateway();
    let executor = Arc::new(PatternExecutor::new(
        gateway.clone(),
        Arc::new(InMemoryBus::new()) as Arc<dyn BusAdapter>,
        Arc::new(FakeNodeTransport::new()) as Arc<dyn orc_adapters::NodeTransport>,
        NodeSelector::default(),
        FakeClock::new(),
        "r1",
    ));
    let manager = JobManager::with_rate_limits(
        gateway.clone(),
        executor,
        FakeClock::new(),
        "r1",
        crate::env::RateLimits {
            high: 0,
            normal: 0,
            low: 1,
        },
    );
    register_node(&gateway, "a", "a:9000");
    register_node(&gateway, "b", "b:9000");

    manager
        .submit(fan_out_spec(&["a", "b"]), "owner", Priority::Low, None)
        .expect("first submission within budget");
    let err = manager
        .submit(fan_out_spec(&["a", "b"]), "owner", Priority::Low, None)
        .unwrap_err();
    assert!(matches!(err, JobManagerError::RateLimited));
}

#[tokio::test]
async fn status_of_unknown_job_is_none() {
    let (_dir, manager) = manager();
    assert!(manager.status(JobId::new()).is_none());
}

#[tokio::test]
async fn cancel_of_unknown_job_is_not_found() {
    let (_dir, manager) = manager();
    assert_eq!(manager.cancel(JobId::new()), CancelOutcome::NotFound);
}

#[tokio::test]
async fn cancel_twice_rejects_already_terminal() {
    let (_dir, manager) = manager();
    register_node(&manager.gateway, "a", "a:9000");
    register_node(&manager.gateway, "b", "b:9000");
    let job_id = manager
        .submit(fan_out_spec(&["a", "b"]), "owner", Priority::Normal, None)
        .expect("submit");

    manager.gateway.apply(Event::JobStateChanged {
        job_id,
        state: JobState::Cancelled,
    }).expect("force terminal");

    assert_eq!(manager.cancel(job_id), CancelOutcome::AlreadyTerminal);
}

#[tokio::test]
async fn result_of_completed_job_is_ready() {
    let (_dir, manager) = manager();
    register_node(&manager.gateway, "a", "a:9000");
    register_node(&manager.gateway, "b", "b:9000");
    let job_id = manager
        .submit(fan_out_spec(&["a", "b"]), "owner", Priority::Normal, None)
        .expect("submit");

    manager
        .gateway
        .apply(Event::JobStateChanged { job_id, state: JobState::Running })
        .expect("force running");
    manager.gateway.apply(Event::JobStateChanged {
        job_id,
        state: JobState::Completed { result: "blob-1".into() },
    }).expect("force completed");

    let result = manager.result(job_id).expect("result present");
    assert!(matches!(result, GetResultResponse::Ready { .. }));
}

#[tokio::test]
async fn sweep_once_drops_expired_terminal_jobs_from_the_index() {
    let (_dir, gateway) = gateway();
    let executor = Arc::new(PatternExecutor::new(
        gateway.clone(),
        Arc::new(InMemoryBus::new()) as Arc<dyn BusAdapter>,
        Arc::new(FakeNodeTransport::new()) as Arc<dyn orc_adapters::NodeTransport>,
        NodeSelector::default(),
        FakeClock::new(),
        "r1",
    ));
    let clock = FakeClock::new();
    let manager = JobManager::new(gateway.clone(), executor, clock.clone(), "r1");

    register_node(&gateway, "a", "a:9000");
    register_node(&gateway, "b", "b:9000");
    let job_id = manager
        .submit(fan_out_spec(&["a", "b"]), "owner", Priority::Normal, None)
        .expect("submit");
    gateway
        .apply(Event::JobStateChanged {
            job_id,
            state: JobState::Cancelled,
        })
        .expect("force terminal");

    clock.advance(Duration::from_secs(3600 * 2));
    manager.sweep_once();

    assert!(manager.status(job_id).is_none());
}
