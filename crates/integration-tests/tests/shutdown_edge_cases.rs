//! Shutdown Edge Cases - cancellation and drain behaviour

use orderqueue_core::application::run::{execute, RunPlan};
use orderqueue_core::application::{cancel_channel, Consumer, StopReason};
use orderqueue_core::domain::{Category, QueueConfig, QueueError, WorkItem};
use orderqueue_core::port::FixedItemSource;
use orderqueue_core::BoundedOrderQueue;
use std::sync::Arc;
use std::time::Duration;

/// Cancelled consumer on an empty queue leaves it usable
#[tokio::test(start_paused = true)]
async fn test_cancelled_consumer_then_submit_and_take() {
    let queue = Arc::new(BoundedOrderQueue::with_capacity(2).unwrap());
    let (cancel_tx, cancel) = cancel_channel();

    let consumer = Consumer::new("consumer1", queue.clone());
    let handle = tokio::spawn(async move { consumer.run(Some(1), cancel).await });
    tokio::time::sleep(Duration::from_secs(1)).await;

    cancel_tx.cancel();
    let summary = handle.await.unwrap().unwrap();
    assert_eq!(summary.stop, StopReason::Cancelled);
    assert_eq!(queue.len().await, 0);
    assert!(queue.snapshot().await.is_empty());

    queue
        .submit(WorkItem::new(1, Category::Hiking, 0))
        .await
        .unwrap();
    let processed = queue.take_and_process().await.unwrap();
    assert_eq!(processed.item.id(), 1);
    assert!(processed.elapsed >= Duration::from_millis(200));
    assert!(processed.elapsed < Duration::from_millis(210));
}

/// Cancelling a run mid-way accounts for every submitted order
#[tokio::test(start_paused = true)]
async fn test_cancelled_run_loses_nothing() {
    let queue = Arc::new(BoundedOrderQueue::with_capacity(3).unwrap());
    let (cancel_tx, cancel) = cancel_channel();

    let run = tokio::spawn(execute(
        queue.clone(),
        Box::new(FixedItemSource::uniform(10, 20)),
        RunPlan::fixed(2, 5),
        cancel,
    ));
    tokio::time::sleep(Duration::from_millis(1500)).await;

    cancel_tx.cancel();
    let report = run.await.unwrap().unwrap();

    report.verify().unwrap();
    assert_eq!(report.producer.stop, StopReason::Cancelled);
    assert!(report.producer.submitted.len() < 10);
    assert!(report
        .consumers
        .iter()
        .all(|c| matches!(c.stop, StopReason::Cancelled | StopReason::Interrupted)));
}

/// Closing wakes a blocked producer and lets consumers drain
#[tokio::test(start_paused = true)]
async fn test_close_unblocks_producer_and_drains() {
    let queue = Arc::new(BoundedOrderQueue::new(QueueConfig::instant(2)).unwrap());
    for id in 1..=2 {
        queue
            .submit(WorkItem::new(id, Category::Sneakers, 1))
            .await
            .unwrap();
    }

    let q = queue.clone();
    let producer = tokio::spawn(async move { q.submit(WorkItem::new(3, Category::Running, 1)).await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    queue.close().await;
    assert_eq!(producer.await.unwrap(), Err(QueueError::Closed));

    let summary = Consumer::new("drain", queue.clone())
        .run(None, orderqueue_core::application::CancelToken::never())
        .await
        .unwrap();
    let ids: Vec<u64> = summary.fulfilled.iter().map(|f| f.item.id()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(summary.stop, StopReason::Closed);
}
