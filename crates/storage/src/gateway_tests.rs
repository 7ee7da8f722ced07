use super::*;
use crate::blob::FsBlobStore;
use crate::registry::FsNameRegistry;
use orc_core::{Clock, JobId, JobState, Priority, SystemClock};
use tempfile::tempdir;

fn new_gateway(dir: &std::path::Path) -> StateGateway {
    let blobs = Arc::new(FsBlobStore::new(dir.join("blobs")));
    let names = Arc::new(FsNameRegistry::new(dir.join("names.json")));
    StateGateway::open(dir.join("events.wal"), blobs, names).unwrap()
}

#[tokio::test]
async fn apply_persists_and_materializes_a_job_submission() {
    let dir = tempdir().unwrap();
    let gateway = new_gateway(dir.path());
    let job_id = JobId::new();
    let spec = orc_core::test_support::fan_out_spec("m1", &["a", "b"]);

    gateway
        .apply(Event::JobSubmitted {
            job_id,
            spec,
            owner: "alice".into(),
            priority: Priority::Normal,
            cost_ceiling: None,
            owner_replica: "r1".into(),
            submitted_at_epoch_ms: SystemClock.epoch_ms(),
        })
        .unwrap();

    assert!(gateway.read().get_job(job_id.as_str()).is_some());
}

#[tokio::test]
async fn reopening_the_gateway_replays_prior_events() {
    let dir = tempdir().unwrap();
    let job_id = JobId::new();
    {
        let gateway = new_gateway(dir.path());
        let spec = orc_core::test_support::fan_out_spec("m1", &["a", "b"]);
        gateway
            .apply(Event::JobSubmitted {
                job_id,
                spec,
                owner: "alice".into(),
                priority: Priority::Normal,
                cost_ceiling: None,
                owner_replica: "r1".into(),
            })
            .unwrap();
        gateway
            .apply(Event::JobStateChanged {
                job_id,
                state: JobState::Running,
            })
            .unwrap();
    }

    let gateway = new_gateway(dir.path());
    let job = gateway.read().get_job(job_id.as_str()).unwrap().clone();
    assert_eq!(job.state, JobState::Running);
}

#[tokio::test]
async fn put_and_get_blob_round_trips_through_the_gateway() {
    let dir = tempdir().unwrap();
    let gateway = new_gateway(dir.path());

    let handle = gateway.put_blob(b"result payload").await.unwrap();
    let bytes = gateway.get_blob(&handle).await.unwrap();
    assert_eq!(bytes, b"result payload");
}

#[tokio::test]
async fn publish_fleet_snapshot_writes_the_named_record() {
    let dir = tempdir().unwrap();
    let gateway = new_gateway(dir.path());
    gateway
        .apply(Event::NodeHeartbeatReceived {
            node_id: "node-a".into(),
            endpoint: "http://node-a:9000".into(),
            capabilities: vec![],
            load: orc_core::NodeLoad::default(),
            sequence: 1,
        })
        .unwrap();

    gateway.publish_fleet_snapshot().await.unwrap();

    let handle = gateway
        .names
        .get(crate::registry::FLEET_REGISTRY_NAME)
        .await
        .unwrap()
        .expect("fleet snapshot handle recorded");
    let bytes = gateway.blobs.get(&handle).await.unwrap();
    assert!(!bytes.is_empty());
}
