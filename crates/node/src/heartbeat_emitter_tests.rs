use super::*;
use orc_adapters::InMemoryBus;

fn emitter() -> (HeartbeatEmitter, Arc<dyn BusAdapter>) {
    let bus = Arc::new(InMemoryBus::new()) as Arc<dyn BusAdapter>;
    let accountant = Arc::new(ResourceAccountant::new(4.0, 1 << 30, 0, 4));
    let emitter = HeartbeatEmitter::new(bus.clone(), NodeId::from("node-1"), "node-1:9000", vec!["gpu".into()], accountant);
    (emitter, bus)
}

#[tokio::test]
async fn publish_once_carries_identity_and_load() {
    let (emitter, bus) = emitter();
    let mut rx = bus.subscribe(Topic::NodesHeartbeat);

    emitter.publish_once(8).await;

    let envelope = rx.try_recv().expect("heartbeat published");
    let EnvelopeBody::NodeHeartbeat {
        node_id,
        endpoint,
        capabilities,
        load,
    } = envelope.body
    else {
        panic!("expected NodeHeartbeat body");
    };
    assert_eq!(node_id.as_str(), "node-1");
    assert_eq!(endpoint.as_str(), "node-1:9000");
    assert_eq!(capabilities, vec![SmolStr::new("gpu")]);
    assert_eq!(load.declared_capacity, 8);
    assert_eq!(envelope.sequence, 0);
}

#[tokio::test]
async fn sequence_numbers_are_monotonic_across_publishes() {
    let (emitter, bus) = emitter();
    let mut rx = bus.subscribe(Topic::NodesHeartbeat);

    emitter.publish_once(8).await;
    emitter.publish_once(8).await;
    emitter.publish_once(8).await;

    let sequences: Vec<u64> = (0..3).map(|_| rx.try_recv().expect("heartbeat").sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
}

#[tokio::test]
async fn publish_once_reflects_active_worker_count_from_the_accountant() {
    let (emitter, bus) = emitter();
    let mut rx = bus.subscribe(Topic::NodesHeartbeat);

    let token = emitter.accountant.try_reserve(crate::resource_accountant::ResourceRequest {
        cpu_fraction: 1.0,
        memory_bytes: 1,
        accelerator_slots: 0,
    }).expect("reserve");

    emitter.publish_once(8).await;
    let envelope = rx.try_recv().expect("heartbeat published");
    let EnvelopeBody::NodeHeartbeat { load, .. } = envelope.body else {
        panic!("expected NodeHeartbeat body");
    };
    assert_eq!(load.active_jobs, 1);

    emitter.accountant.release(token);
}

#[tokio::test]
async fn publish_once_reflects_reserved_resource_fractions() {
    let (emitter, bus) = emitter();
    let mut rx = bus.subscribe(Topic::NodesHeartbeat);

    let token = emitter
        .accountant
        .try_reserve(crate::resource_accountant::ResourceRequest {
            cpu_fraction: 2.0,
            memory_bytes: 1 << 29,
            accelerator_slots: 0,
        })
        .expect("reserve");

    emitter.publish_once(4).await;
    let envelope = rx.try_recv().expect("heartbeat published");
    let EnvelopeBody::NodeHeartbeat { load, .. } = envelope.body else {
        panic!("expected NodeHeartbeat body");
    };
    assert!((load.reserved_cpu_fraction - 0.5).abs() < 1e-9);
    assert!((load.reserved_memory_fraction - 0.5).abs() < 1e-9);
    assert!((load.reserved_slot_fraction - 0.25).abs() < 1e-9);

    emitter.accountant.release(token);
}

#[tokio::test]
async fn a_missed_subscriber_does_not_fail_the_publish() {
    let (emitter, _bus) = emitter();
    // No subscriber attached; InMemoryBus treats this as tolerated, not an error.
    emitter.publish_once(8).await;
}
