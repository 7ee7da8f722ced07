use super::*;
use crate::node_selector::NodeSelector;
use crate::test_support::{gateway, register_node};
use orc_adapters::{fake::FakeNodeTransport, BusAdapter, InMemoryBus};
use orc_core::work_item::PartialOutcome;
use orc_core::{AggregationKind, Clock, FakeClock, FanOutSpec, JobId, PartialResult};
use std::time::Duration;

fn ctx(
    transport: std::sync::Arc<FakeNodeTransport>,
    clock: FakeClock,
) -> (tempfile::TempDir, ExecCtx<FakeClock>) {
    let (dir, gateway) = gateway();
    let ctx = ExecCtx {
        gateway,
        bus: std::sync::Arc::new(InMemoryBus::new()) as std::sync::Arc<dyn BusAdapter>,
        transport,
        selector: NodeSelector::default(),
        clock,
    };
    (dir, ctx)
}

fn spec(nodes: &[&str]) -> FanOutSpec {
    FanOutSpec {
        model: "m1".into(),
        nodes: nodes.iter().map(|n| (*n).into()).collect(),
        data: "sel".into(),
        aggregation: AggregationKind::Mean,
        privacy: None,
        minimum_reputation: 0.0,
        timeout: Duration::from_secs(30),
    }
}

async fn seed_blob_partial(gateway: &orc_storage::StateGateway, vector: Vec<f64>) -> smol_str::SmolStr {
    let bytes = serde_json::to_vec(&vector).unwrap();
    let handle = gateway.put_blob(&bytes).await.unwrap();
    smol_str::SmolStr::new(handle.to_string())
}

#[tokio::test]
async fn happy_fan_out_fuses_the_mean() {
    let clock = FakeClock::new();
    let transport = std::sync::Arc::new(FakeNodeTransport::new());
    let (_dir, ctx) = ctx(transport.clone(), clock.clone());
    register_node(&ctx.gateway, "a", "a:9000");
    register_node(&ctx.gateway, "b", "b:9000");
    register_node(&ctx.gateway, "c", "c:9000");

    for vector in [vec![1.0, 1.0], vec![3.0, 3.0], vec![5.0, 5.0]] {
        let handle = seed_blob_partial(&ctx.gateway, vector).await;
        transport.push_ok(PartialResult {
            work_item_id: orc_core::work_item::WorkItemId::new(),
            node_id: "a".into(),
            outcome: PartialOutcome::Ok(handle),
            elapsed: Duration::from_millis(1),
        });
    }

    let spec = spec(&["a", "b", "c"]);
    let deadline = clock.now() + Duration::from_secs(60);
    let handle = run(&ctx, JobId::new(), &spec, deadline).await.unwrap();
    let bytes = ctx
        .gateway
        .get_blob(&orc_storage::BlobHandle(handle.to_string()))
        .await
        .unwrap();
    let fused: Vec<f64> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(fused, vec![3.0, 3.0]);
}

#[tokio::test]
async fn quorum_lost_when_too_many_partials_fail() {
    let clock = FakeClock::new();
    let transport = std::sync::Arc::new(FakeNodeTransport::new());
    let (_dir, ctx) = ctx(transport.clone(), clock.clone());
    register_node(&ctx.gateway, "a", "a:9000");
    register_node(&ctx.gateway, "b", "b:9000");
    register_node(&ctx.gateway, "c", "c:9000");

    transport.push_err("crash");
    transport.push_err("crash");
    let handle = seed_blob_partial(&ctx.gateway, vec![1.0]).await;
    transport.push_ok(PartialResult {
        work_item_id: orc_core::work_item::WorkItemId::new(),
        node_id: "a".into(),
        outcome: PartialOutcome::Ok(handle),
        elapsed: Duration::from_millis(1),
    });

    let spec = spec(&["a", "b", "c"]);
    let deadline = clock.now() + Duration::from_secs(60);
    let err = run(&ctx, JobId::new(), &spec, deadline).await.unwrap_err();
    assert!(matches!(
        err,
        orc_core::ErrorKind::Fusion(orc_core::error::FusionErrorKind::QuorumLost)
    ));
}

#[tokio::test]
async fn insufficient_live_nodes_is_a_spec_error() {
    let clock = FakeClock::new();
    let transport = std::sync::Arc::new(FakeNodeTransport::new());
    let (_dir, ctx) = ctx(transport, clock.clone());
    register_node(&ctx.gateway, "a", "a:9000");

    let spec = spec(&["a", "b"]);
    let deadline = clock.now() + Duration::from_secs(60);
    let err = run(&ctx, JobId::new(), &spec, deadline).await.unwrap_err();
    assert!(matches!(
        err,
        orc_core::ErrorKind::Spec(orc_core::error::SpecErrorKind::InsufficientNodes)
    ));
}
