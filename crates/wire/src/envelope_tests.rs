use super::*;
use orc_core::{JobState, NodeLoad};

fn sample_envelope(body: EnvelopeBody) -> Envelope {
    Envelope {
        kind: "test".into(),
        sender_id: "r1".into(),
        sequence: 1,
        timestamp: chrono::Utc::now(),
        body,
    }
}

#[test]
fn job_update_round_trips_through_json() {
    let envelope = sample_envelope(EnvelopeBody::JobUpdate {
        job_id: orc_core::JobId::new(),
        state: JobState::Pending,
    });
    let raw = serde_json::to_vec(&envelope).unwrap();
    let decoded: Envelope = serde_json::from_slice(&raw).unwrap();
    assert_eq!(decoded.sequence, envelope.sequence);
    assert!(matches!(decoded.body, EnvelopeBody::JobUpdate { .. }));
}

#[test]
fn node_heartbeat_carries_declared_load() {
    let envelope = sample_envelope(EnvelopeBody::NodeHeartbeat {
        node_id: "node-a".into(),
        endpoint: "https://node-a.local".into(),
        capabilities: vec!["gpu".into()],
        load: NodeLoad {
            active_jobs: 2,
            declared_capacity: 10,
            reserved_cpu_fraction: 0.2,
            reserved_memory_fraction: 0.1,
            reserved_slot_fraction: 0.2,
        },
    });
    let raw = serde_json::to_vec(&envelope).unwrap();
    let decoded: Envelope = serde_json::from_slice(&raw).unwrap();
    match decoded.body {
        EnvelopeBody::NodeHeartbeat { load, .. } => assert_eq!(load.active_jobs, 2),
        other => panic!("unexpected body: {other:?}"),
    }
}

#[test]
fn unknown_fields_on_the_envelope_are_ignored() {
    let raw = serde_json::json!({
        "type": "test",
        "sender_id": "r1",
        "sequence": 3,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "future_field": "ignored",
        "body": {
            "topic": "job_cancel",
            "job_id": orc_core::JobId::new().to_string(),
        }
    });
    let decoded: Envelope = serde_json::from_value(raw).unwrap();
    assert!(matches!(decoded.body, EnvelopeBody::JobCancel { .. }));
}
