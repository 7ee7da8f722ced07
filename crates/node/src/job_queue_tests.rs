use std::time::{Duration, Instant};

use super::*;
use orc_core::{JobId, NodeId, Priority};

fn footprint() -> ResourceRequest {
    ResourceRequest {
        cpu_fraction: 1.0,
        memory_bytes: 1,
        accelerator_slots: 0,
    }
}

fn work(node: &str) -> WorkItem {
    WorkItem::new(JobId::new(), NodeId::from(node), "m1".into(), "inputs", Duration::from_secs(30), Instant::now())
}

#[tokio::test]
async fn pops_high_priority_before_normal() {
    let queue = JobQueue::new();
    let accountant = ResourceAccountant::new(100.0, 1 << 30, 0, 100);
    queue.enqueue(work("a"), Priority::Normal, &accountant, footprint()).unwrap();
    queue.enqueue(work("b"), Priority::High, &accountant, footprint()).unwrap();

    let first = queue.pop().await;
    assert_eq!(first.node_id.as_str(), "b");
}

#[tokio::test]
async fn breaks_ties_by_enqueue_order() {
    let queue = JobQueue::new();
    let accountant = ResourceAccountant::new(100.0, 1 << 30, 0, 100);
    queue.enqueue(work("first"), Priority::Normal, &accountant, footprint()).unwrap();
    queue.enqueue(work("second"), Priority::Normal, &accountant, footprint()).unwrap();

    assert_eq!(queue.pop().await.node_id.as_str(), "first");
    assert_eq!(queue.pop().await.node_id.as_str(), "second");
}

#[tokio::test]
async fn enqueue_returns_denied_without_headroom() {
    let queue = JobQueue::new();
    let accountant = ResourceAccountant::new(0.5, 1 << 30, 0, 100);
    let result = queue.enqueue(work("a"), Priority::Normal, &accountant, footprint());
    assert_eq!(result, Err(ResourceError::Denied));
    assert!(queue.is_empty());
}

#[tokio::test]
async fn pop_waits_for_a_notification() {
    let queue = std::sync::Arc::new(JobQueue::new());
    let accountant = ResourceAccountant::new(100.0, 1 << 30, 0, 100);

    let waiter = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.pop().await })
    };
    tokio::task::yield_now().await;
    queue.enqueue(work("late"), Priority::Low, &accountant, footprint()).unwrap();

    let popped = waiter.await.unwrap();
    assert_eq!(popped.node_id.as_str(), "late");
}
