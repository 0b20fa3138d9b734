// Producer - Order generation and submission loop

use crate::application::cancel::CancelToken;
use crate::application::order_queue::BoundedOrderQueue;
use crate::application::StopReason;
use crate::domain::{ItemId, QueueError};
use crate::error::Result;
use crate::port::ItemSource;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// What the producer did during one run
#[derive(Debug, Clone, Serialize)]
pub struct ProducerSummary {
    pub name: String,
    /// Items generated up front (ids fixed at this point)
    pub generated: usize,
    /// Ids accepted by the queue, in submission order
    pub submitted: Vec<ItemId>,
    pub stop: StopReason,
}

/// Producer generates a batch of orders and feeds them to the queue
pub struct Producer {
    name: String,
    queue: Arc<BoundedOrderQueue>,
    source: Box<dyn ItemSource>,
}

impl Producer {
    pub fn new(
        name: impl Into<String>,
        queue: Arc<BoundedOrderQueue>,
        source: Box<dyn ItemSource>,
    ) -> Self {
        Self {
            name: name.into(),
            queue,
            source,
        }
    }

    /// Generate `count` orders, then submit them one by one.
    ///
    /// Stops early when `cancel` fires while blocked or the queue is closed.
    pub async fn run(mut self, count: usize, cancel: CancelToken) -> Result<ProducerSummary> {
        let items = self.source.generate(count);
        if items.len() < count {
            warn!(
                producer = %self.name,
                requested = count,
                generated = items.len(),
                "Item source exhausted early"
            );
        }
        info!(producer = %self.name, orders = items.len(), "Producer started");

        let generated = items.len();
        let mut submitted = Vec::with_capacity(generated);
        let mut stop = StopReason::Completed;

        for item in items {
            let id = item.id();
            if cancel.is_cancelled() {
                info!(producer = %self.name, order_id = id, "Producer cancelled before next order");
                stop = StopReason::Cancelled;
                break;
            }
            match self.queue.submit_until(item, &cancel).await {
                Ok(()) => submitted.push(id),
                Err(QueueError::Cancelled) => {
                    info!(producer = %self.name, order_id = id, "Producer cancelled while waiting");
                    stop = StopReason::Cancelled;
                    break;
                }
                Err(QueueError::Closed) => {
                    info!(producer = %self.name, order_id = id, "Queue closed, producer stopping");
                    stop = StopReason::Closed;
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            producer = %self.name,
            submitted = submitted.len(),
            stop = ?stop,
            "Producer stopped"
        );
        Ok(ProducerSummary {
            name: self.name,
            generated,
            submitted,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cancel::cancel_channel;
    use crate::domain::QueueConfig;
    use crate::port::FixedItemSource;
    use std::time::Duration;

    #[tokio::test]
    async fn test_producer_submits_in_generation_order() {
        let queue = Arc::new(BoundedOrderQueue::new(QueueConfig::instant(5)).unwrap());
        let producer = Producer::new(
            "producer",
            queue.clone(),
            Box::new(FixedItemSource::new(vec![3, 1, 4])),
        );

        let summary = producer.run(3, CancelToken::never()).await.unwrap();
        assert_eq!(summary.stop, StopReason::Completed);
        assert_eq!(summary.submitted, vec![1, 2, 3]);

        let queued: Vec<u32> = queue.snapshot().await.iter().map(|i| i.quantity()).collect();
        assert_eq!(queued, vec![3, 1, 4]);
    }

    #[tokio::test]
    async fn test_producer_handles_exhausted_source() {
        let queue = Arc::new(BoundedOrderQueue::new(QueueConfig::instant(5)).unwrap());
        let producer = Producer::new("producer", queue, Box::new(FixedItemSource::uniform(2, 1)));

        let summary = producer.run(4, CancelToken::never()).await.unwrap();
        assert_eq!(summary.generated, 2);
        assert_eq!(summary.submitted.len(), 2);
        assert_eq!(summary.stop, StopReason::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_cancelled_while_full() {
        let queue = Arc::new(BoundedOrderQueue::new(QueueConfig::instant(2)).unwrap());
        let (cancel_tx, cancel) = cancel_channel();
        let producer = Producer::new(
            "producer",
            queue.clone(),
            Box::new(FixedItemSource::uniform(5, 0)),
        );

        let handle = tokio::spawn(producer.run(5, cancel));
        tokio::time::sleep(Duration::from_millis(100)).await;

        cancel_tx.cancel();
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.stop, StopReason::Cancelled);
        assert_eq!(summary.submitted, vec![1, 2]);
        assert_eq!(queue.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_stops_when_cancelled_during_acceptance() {
        let config = QueueConfig::instant(3).with_acceptance_delay(Duration::from_secs(1));
        let queue = Arc::new(BoundedOrderQueue::new(config).unwrap());
        let (cancel_tx, cancel) = cancel_channel();
        let producer = Producer::new(
            "producer",
            queue.clone(),
            Box::new(FixedItemSource::uniform(10, 0)),
        );

        let handle = tokio::spawn(producer.run(10, cancel));
        tokio::time::sleep(Duration::from_millis(500)).await;

        cancel_tx.cancel();
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.stop, StopReason::Cancelled);
        assert_eq!(summary.submitted, vec![1]);
        assert_eq!(queue.len().await, 1);
    }
}
