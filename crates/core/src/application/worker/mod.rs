// Worker - Order fulfilment loop (consumer side)

pub mod constants;

use crate::application::cancel::CancelToken;
use crate::application::order_queue::{elapsed_millis, BoundedOrderQueue, ProcessedItem};
use crate::application::StopReason;
use crate::domain::{QueueError, WorkItem};
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// One fulfilled order as seen by the consumer that handled it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfilledOrder {
    /// Position in the queue's global removal order
    pub sequence: u64,
    pub item: WorkItem,
    pub elapsed_ms: u64,
}

impl From<ProcessedItem> for FulfilledOrder {
    fn from(processed: ProcessedItem) -> Self {
        Self {
            sequence: processed.sequence,
            item: processed.item,
            elapsed_ms: elapsed_millis(processed.elapsed),
        }
    }
}

/// What a consumer did during one run
#[derive(Debug, Clone, Serialize)]
pub struct ConsumerSummary {
    pub name: String,
    pub fulfilled: Vec<FulfilledOrder>,
    /// Order removed from the queue but not finished because of cancellation
    pub interrupted: Option<WorkItem>,
    pub stop: StopReason,
}

/// Consumer fulfils orders from a shared queue
pub struct Consumer {
    name: String,
    queue: Arc<BoundedOrderQueue>,
}

impl Consumer {
    pub fn new(name: impl Into<String>, queue: Arc<BoundedOrderQueue>) -> Self {
        Self {
            name: name.into(),
            queue,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the fulfilment loop.
    ///
    /// Stops after `quota` orders (None: until the queue is closed and
    /// drained), or as soon as `cancel` fires.
    pub async fn run(&self, quota: Option<usize>, cancel: CancelToken) -> Result<ConsumerSummary> {
        info!(consumer = %self.name, ?quota, "Consumer started");
        let mut fulfilled = Vec::new();
        let mut interrupted = None;

        let stop = loop {
            if quota.is_some_and(|quota| fulfilled.len() >= quota) {
                break StopReason::Completed;
            }
            if cancel.is_cancelled() {
                info!(consumer = %self.name, "Consumer cancelled before next order");
                break StopReason::Cancelled;
            }
            match self.queue.take_and_process_until(&cancel).await {
                Ok(processed) => {
                    info!(
                        consumer = %self.name,
                        order_id = processed.item.id(),
                        elapsed_ms = elapsed_millis(processed.elapsed),
                        "Consumer fulfilled order"
                    );
                    fulfilled.push(FulfilledOrder::from(processed));
                }
                Err(QueueError::Cancelled) => {
                    info!(consumer = %self.name, "Consumer cancelled while waiting");
                    break StopReason::Cancelled;
                }
                Err(QueueError::Closed) => {
                    info!(consumer = %self.name, "Queue closed and drained");
                    break StopReason::Closed;
                }
                Err(QueueError::Interrupted(item)) => {
                    warn!(consumer = %self.name, order_id = item.id(), "Consumer interrupted mid-order");
                    interrupted = Some(item);
                    break StopReason::Interrupted;
                }
                Err(e @ QueueError::TimedOut(_)) => return Err(e.into()),
            }
        };

        info!(
            consumer = %self.name,
            fulfilled = fulfilled.len(),
            stop = ?stop,
            "Consumer stopped"
        );
        Ok(ConsumerSummary {
            name: self.name.clone(),
            fulfilled,
            interrupted,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cancel::cancel_channel;
    use crate::domain::{Category, QueueConfig};
    use std::time::Duration;

    fn queue(capacity: usize) -> Arc<BoundedOrderQueue> {
        Arc::new(BoundedOrderQueue::new(QueueConfig::instant(capacity)).unwrap())
    }

    #[tokio::test]
    async fn test_consumer_stops_at_quota() {
        let queue = queue(5);
        for id in 1..=4 {
            queue
                .submit(WorkItem::new(id, Category::Running, 1))
                .await
                .unwrap();
        }

        let consumer = Consumer::new("consumer1", queue.clone());
        let summary = consumer.run(Some(3), CancelToken::never()).await.unwrap();

        assert_eq!(summary.stop, StopReason::Completed);
        let ids: Vec<u64> = summary.fulfilled.iter().map(|f| f.item.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_consumer_without_quota_drains_until_closed() {
        let queue = queue(3);
        for id in 1..=3 {
            queue
                .submit(WorkItem::new(id, Category::Hiking, 0))
                .await
                .unwrap();
        }
        queue.close().await;

        let summary = Consumer::new("drain", queue)
            .run(None, CancelToken::never())
            .await
            .unwrap();
        assert_eq!(summary.stop, StopReason::Closed);
        assert_eq!(summary.fulfilled.len(), 3);
        assert_eq!(summary.fulfilled[2].sequence, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consumer_cancelled_while_idle() {
        let queue = queue(1);
        let (cancel_tx, cancel) = cancel_channel();

        let consumer = Consumer::new("idle", queue.clone());
        let handle = tokio::spawn(async move { consumer.run(Some(5), cancel).await });
        tokio::time::sleep(Duration::from_millis(100)).await;

        cancel_tx.cancel();
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.stop, StopReason::Cancelled);
        assert!(summary.fulfilled.is_empty());
        assert!(summary.interrupted.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_consumer_reports_interrupted_order() {
        let config = QueueConfig::instant(1)
            .with_processing_delay(Duration::from_secs(30), Duration::ZERO);
        let queue = Arc::new(BoundedOrderQueue::new(config).unwrap());
        queue
            .submit(WorkItem::new(1, Category::Sneakers, 2))
            .await
            .unwrap();
        let (cancel_tx, cancel) = cancel_channel();

        let consumer = Consumer::new("busy", queue);
        let handle = tokio::spawn(async move { consumer.run(None, cancel).await });
        tokio::time::sleep(Duration::from_secs(1)).await;

        cancel_tx.cancel();
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.stop, StopReason::Interrupted);
        assert_eq!(summary.interrupted.map(|item| item.id()), Some(1));
    }

    #[tokio::test]
    async fn test_cancelled_consumer_leaves_head_queued() {
        let queue = queue(2);
        queue
            .submit(WorkItem::new(1, Category::Hiking, 4))
            .await
            .unwrap();
        let (cancel_tx, cancel) = cancel_channel();
        cancel_tx.cancel();

        let consumer = Consumer::new("late", queue.clone());
        assert_eq!(consumer.name(), "late");
        let summary = consumer.run(None, cancel).await.unwrap();

        assert_eq!(summary.stop, StopReason::Cancelled);
        assert!(summary.fulfilled.is_empty());
        assert!(summary.interrupted.is_none());
        assert_eq!(queue.snapshot().await, vec![WorkItem::new(1, Category::Hiking, 4)]);
        assert_eq!(queue.stats().taken, 0);
    }
}
