use super::*;
use crate::test_support::gateway;
use orc_adapters::InMemoryBus;
use orc_core::FakeClock;

fn coordinator(clock: FakeClock) -> (tempfile::TempDir, PeerCoordinator<FakeClock>, Arc<StateGateway>) {
    let (dir, gateway) = gateway();
    let bus = Arc::new(InMemoryBus::new()) as Arc<dyn BusAdapter>;
    (dir, PeerCoordinator::new(gateway.clone(), bus, clock, "r1"), gateway)
}

fn seed_peer(gateway: &StateGateway, id: &str, endpoint: &str, active: u32, capacity: u32) {
    gateway
        .apply(Event::PeerHeartbeatReceived {
            peer_id: id.into(),
            endpoint: endpoint.into(),
            active_job_count: active,
            capacity,
            sequence: 1,
        })
        .expect("apply PeerHeartbeatReceived");
}

#[tokio::test]
async fn apply_envelope_upserts_a_peer() {
    let (_dir, coordinator, gateway) = coordinator(FakeClock::new());
    coordinator.apply_envelope(
        EnvelopeBody::OrchestratorHeartbeat {
            orchestrator_id: "r2".into(),
            endpoint: "r2:9100".into(),
            active_job_count: 3,
            capacity: 10,
        },
        1,
    );
    let state = gateway.read();
    let peer = state.get_peer("r2").expect("peer present");
    assert_eq!(peer.endpoint.as_str(), "r2:9100");
    assert_eq!(peer.active_job_count, 3);
}

#[tokio::test]
async fn apply_envelope_ignores_its_own_heartbeat() {
    let (_dir, coordinator, gateway) = coordinator(FakeClock::new());
    coordinator.apply_envelope(
        EnvelopeBody::OrchestratorHeartbeat {
            orchestrator_id: "r1".into(),
            endpoint: "r1:9100".into(),
            active_job_count: 1,
            capacity: 4,
        },
        1,
    );
    assert!(gateway.read().peers.is_empty());
}

#[tokio::test]
async fn apply_envelope_ignores_non_heartbeat_bodies() {
    let (_dir, coordinator, gateway) = coordinator(FakeClock::new());
    coordinator.apply_envelope(
        EnvelopeBody::JobCancel { job_id: JobId::new() },
        1,
    );
    assert!(gateway.read().peers.is_empty());
}

#[tokio::test]
async fn maybe_offer_handoff_is_a_no_op_when_not_saturated() {
    let (_dir, coordinator, gateway) = coordinator(FakeClock::new());
    seed_peer(&gateway, "r2", "r2:9100", 1, 10);
    let offered = coordinator.maybe_offer_handoff(JobId::new(), 1).await;
    assert!(!offered);
}

#[tokio::test]
async fn maybe_offer_handoff_publishes_when_a_light_peer_exists() {
    let (_dir, coordinator, gateway) = coordinator(FakeClock::new());
    seed_peer(&gateway, "r2", "r2:9100", 1, 10);

    let mut rx = coordinator.bus.subscribe(Topic::OrchestratorHandoff);

    let offered = coordinator.maybe_offer_handoff(JobId::new(), 14).await;
    assert!(offered);
    let envelope = rx.try_recv().expect("handoff offer published");
    assert!(matches!(envelope.body, EnvelopeBody::HandoffOffer { .. }));
}

#[tokio::test]
async fn maybe_offer_handoff_skips_when_all_peers_are_loaded() {
    let (_dir, coordinator, gateway) = coordinator(FakeClock::new());
    seed_peer(&gateway, "r2", "r2:9100", 9, 10);
    let offered = coordinator.maybe_offer_handoff(JobId::new(), 14).await;
    assert!(!offered);
}

#[tokio::test]
async fn maybe_offer_handoff_skips_a_stale_peer() {
    let clock = FakeClock::new();
    let (_dir, coordinator, gateway) = coordinator(clock.clone());
    seed_peer(&gateway, "r2", "r2:9100", 1, 10);

    clock.advance(std::time::Duration::from_secs(3600));

    let offered = coordinator.maybe_offer_handoff(JobId::new(), 14).await;
    assert!(!offered);
}

#[tokio::test]
async fn apply_handoff_accept_transfers_ownership() {
    let (_dir, coordinator, gateway) = coordinator(FakeClock::new());
    let job_id = crate::test_support::submit_job(
        &gateway,
        orc_core::JobSpec::FanOut(orc_core::FanOutSpec {
            model: "m1".into(),
            nodes: vec!["a".into()],
            data: "sel".into(),
            aggregation: orc_core::AggregationKind::Mean,
            privacy: None,
            minimum_reputation: 0.0,
            timeout: std::time::Duration::from_secs(30),
        }),
    );
    assert_eq!(gateway.read().owner_of(&job_id), Some("r1"));

    coordinator.apply_handoff_accept(job_id, "r2".into());

    assert_eq!(gateway.read().owner_of(&job_id), Some("r2"));
}

#[tokio::test]
async fn apply_handoff_accept_is_a_no_op_if_already_reassigned() {
    let (_dir, coordinator, gateway) = coordinator(FakeClock::new());
    let job_id = crate::test_support::submit_job(
        &gateway,
        orc_core::JobSpec::FanOut(orc_core::FanOutSpec {
            model: "m1".into(),
            nodes: vec!["a".into()],
            data: "sel".into(),
            aggregation: orc_core::AggregationKind::Mean,
            privacy: None,
            minimum_reputation: 0.0,
            timeout: std::time::Duration::from_secs(30),
        }),
    );
    gateway
        .apply(Event::JobOwnerChanged { job_id, new_owner: "r3".into() })
        .expect("force reassignment");

    coordinator.apply_handoff_accept(job_id, "r2".into());

    assert_eq!(gateway.read().owner_of(&job_id), Some("r3"));
}
