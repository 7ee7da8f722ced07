use super::*;
use orc_wire::EnvelopeBody;

fn envelope(job_id: orc_core::JobId) -> Envelope {
    Envelope {
        kind: "test".into(),
        sender_id: "r1".into(),
        sequence: 1,
        timestamp: chrono::Utc::now(),
        body: EnvelopeBody::JobCancel { job_id },
    }
}

#[tokio::test]
async fn publish_then_recv_delivers_to_a_subscriber() {
    let bus = InMemoryBus::new();
    let mut receiver = bus.subscribe(Topic::JobsCancel);
    let job_id = orc_core::JobId::new();

    bus.publish(Topic::JobsCancel, envelope(job_id)).await.unwrap();

    let received = receiver.recv().await.unwrap();
    match received.body {
        EnvelopeBody::JobCancel { job_id: received_id } => assert_eq!(received_id, job_id),
        other => panic!("unexpected body: {other:?}"),
    }
}

#[tokio::test]
async fn publish_with_no_subscribers_does_not_error() {
    let bus = InMemoryBus::new();
    let job_id = orc_core::JobId::new();
    bus.publish(Topic::ResultsReady, envelope(job_id)).await.unwrap();
}

#[tokio::test]
async fn distinct_topics_do_not_cross_deliver() {
    let bus = InMemoryBus::new();
    let mut cancel_rx = bus.subscribe(Topic::JobsCancel);
    let mut heartbeat_rx = bus.subscribe(Topic::NodesHeartbeat);
    let job_id = orc_core::JobId::new();

    bus.publish(Topic::JobsCancel, envelope(job_id)).await.unwrap();

    assert!(cancel_rx.try_recv().is_ok());
    assert!(heartbeat_rx.try_recv().is_err());
}
