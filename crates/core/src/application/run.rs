// Run orchestration - one producer and N consumers on a shared queue

use crate::application::cancel::CancelToken;
use crate::application::order_queue::BoundedOrderQueue;
use crate::application::producer::Producer;
use crate::application::report::RunReport;
use crate::application::worker::Consumer;
use crate::error::{AppError, Result};
use crate::port::ItemSource;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, info_span, Instrument};

/// Shape of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    /// Orders the producer generates and submits
    pub orders: usize,
    pub consumers: usize,
    /// Orders per consumer; None lets consumers drain until the queue closes
    pub orders_per_consumer: Option<usize>,
}

impl RunPlan {
    /// Every consumer handles the same fixed number of orders
    pub fn fixed(consumers: usize, orders_per_consumer: usize) -> Self {
        Self {
            orders: consumers * orders_per_consumer,
            consumers,
            orders_per_consumer: Some(orders_per_consumer),
        }
    }
}

/// Spawn the producer and consumers, wait for all of them, and collect the report.
///
/// Without a per-consumer quota the queue is closed once the producer is done,
/// so consumers drain what is left and stop.
pub async fn execute(
    queue: Arc<BoundedOrderQueue>,
    source: Box<dyn ItemSource>,
    plan: RunPlan,
    cancel: CancelToken,
) -> Result<RunReport> {
    info!(
        capacity = queue.capacity(),
        orders = plan.orders,
        consumers = plan.consumers,
        acceptance_policy = ?queue.config().acceptance_policy,
        "Starting run"
    );

    let producer = Producer::new("producer", queue.clone(), source);
    let producer_handle = tokio::spawn(
        producer
            .run(plan.orders, cancel.clone())
            .instrument(info_span!("producer")),
    );

    let mut consumers = JoinSet::new();
    for index in 1..=plan.consumers {
        let consumer = Consumer::new(format!("consumer{}", index), queue.clone());
        let span = info_span!("consumer", name = %consumer.name());
        let token = cancel.clone();
        let quota = plan.orders_per_consumer;
        consumers.spawn(
            async move { consumer.run(quota, token).await }
                .instrument(span),
        );
    }

    let producer_summary = producer_handle
        .await
        .map_err(|e| AppError::Internal(format!("producer task failed: {}", e)))??;

    if plan.orders_per_consumer.is_none() {
        queue.close().await;
    }

    let mut consumer_summaries = Vec::with_capacity(plan.consumers);
    while let Some(joined) = consumers.join_next().await {
        let summary =
            joined.map_err(|e| AppError::Internal(format!("consumer task failed: {}", e)))??;
        consumer_summaries.push(summary);
    }
    consumer_summaries.sort_by(|a, b| a.name.cmp(&b.name));

    let report = RunReport {
        producer: producer_summary,
        consumers: consumer_summaries,
        stats: queue.stats(),
        remaining: queue.snapshot().await,
    };
    info!(
        fulfilled = report.fulfilled_count(),
        remaining = report.remaining.len(),
        "Run finished"
    );
    Ok(report)
}
