use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener as TokioTcpListener;
use tokio_util::sync::CancellationToken;

use super::*;
use orc_core::work_item::PartialOutcome;
use orc_core::{JobId, NodeId};

fn footprint() -> ResourceRequest {
    ResourceRequest {
        cpu_fraction: 1.0,
        memory_bytes: 1,
        accelerator_slots: 0,
    }
}

fn work() -> WorkItem {
    WorkItem::new(
        JobId::new(),
        NodeId::from("node-1"),
        "m1".into(),
        "inputs",
        Duration::from_secs(30),
        Instant::now(),
    )
}

async fn spawn_listener(accountant: Arc<ResourceAccountant>) -> (std::net::SocketAddr, Arc<JobQueue>, Arc<ReplyRegistry>, CancellationToken) {
    let queue = Arc::new(JobQueue::new());
    let replies = Arc::new(ReplyRegistry::new());
    let shutdown = CancellationToken::new();

    let tcp_listener = TokioTcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = tcp_listener.local_addr().expect("local addr");

    let listener = Arc::new(Listener::new(queue.clone(), accountant, replies.clone(), footprint()));
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        let _ = listener.serve(tcp_listener, shutdown_clone).await;
    });

    (addr, queue, replies, shutdown)
}

#[tokio::test]
async fn accepted_work_is_enqueued_and_waits_for_a_reply() {
    let accountant = Arc::new(ResourceAccountant::new(4.0, 1 << 30, 0, 4));
    let (addr, queue, replies, shutdown) = spawn_listener(accountant).await;

    let mut client = tokio::net::TcpStream::connect(addr).await.expect("connect");
    let submitted = work();
    let submitted_id = submitted.id;
    orc_wire::write_frame(&mut client, &submitted).await.expect("write work item");

    // Give the listener a moment to accept, decode, and enqueue.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(queue.len(), 1);

    let popped = queue.pop().await;
    assert_eq!(popped.id, submitted_id);

    let result = PartialResult {
        work_item_id: submitted_id,
        node_id: popped.node_id,
        outcome: PartialOutcome::Ok("out".into()),
        elapsed: Duration::from_millis(5),
    };
    replies.complete(result);

    let received: PartialResult = orc_wire::read_frame(&mut client).await.expect("read result");
    assert_eq!(received.work_item_id, submitted_id);
    assert!(received.is_ok());

    shutdown.cancel();
}

#[tokio::test]
async fn denied_work_closes_the_connection_without_a_reply() {
    let accountant = Arc::new(ResourceAccountant::new(0.0, 1 << 30, 0, 4));
    let (addr, queue, _replies, shutdown) = spawn_listener(accountant).await;

    let mut client = tokio::net::TcpStream::connect(addr).await.expect("connect");
    orc_wire::write_frame(&mut client, &work()).await.expect("write work item");

    let outcome: Result<PartialResult, _> = orc_wire::read_frame(&mut client).await;
    assert!(outcome.is_err(), "expected the connection to close without a reply");
    assert!(queue.is_empty());

    shutdown.cancel();
}
