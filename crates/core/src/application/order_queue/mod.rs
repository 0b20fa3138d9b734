// Bounded Order Queue - FIFO hand-off with backpressure
//
// One mutex guards the sequence; one notifier broadcasts every state change.
// Waiters register on the notifier before inspecting the sequence, so a
// change made between the check and the park is never missed.

mod stats;

pub use stats::StatsSnapshot;

use crate::application::cancel::CancelToken;
use crate::domain::error::Result as QueueResult;
use crate::domain::{
    AcceptancePolicy, QueueConfig, QueueError, QueueState, TrySubmitError, WorkItem,
};
use crate::error::{AppError, Result};
use stats::{QueueStats, Side};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, Notify};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Item handed back by `take_and_process` once its simulated work finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedItem {
    pub item: WorkItem,
    /// 1-based position in the queue's global removal order
    pub sequence: u64,
    /// Time spent in simulated processing
    pub elapsed: Duration,
}

/// Guarded queue contents
#[derive(Debug)]
struct Slots {
    items: VecDeque<WorkItem>,
    closed: bool,
    removed: u64,
}

/// Limits applied to the blocking phase of a single call
#[derive(Clone, Copy, Default)]
struct WaitLimits<'a> {
    cancel: Option<&'a CancelToken>,
    timeout: Option<Duration>,
}

impl<'a> WaitLimits<'a> {
    fn cancellable(cancel: &'a CancelToken) -> Self {
        Self {
            cancel: Some(cancel),
            timeout: None,
        }
    }

    fn timeout(timeout: Duration) -> Self {
        Self {
            cancel: None,
            timeout: Some(timeout),
        }
    }
}

/// Bounded FIFO queue shared by one producer and any number of consumers
#[derive(Debug)]
pub struct BoundedOrderQueue {
    slots: Mutex<Slots>,
    changed: Notify,
    config: QueueConfig,
    stats: QueueStats,
}

impl BoundedOrderQueue {
    /// Create a queue
    ///
    /// # Errors
    /// - AppError::Config if capacity is zero
    pub fn new(config: QueueConfig) -> Result<Self> {
        if config.capacity == 0 {
            return Err(AppError::Config(
                "queue capacity must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            slots: Mutex::new(Slots {
                items: VecDeque::with_capacity(config.capacity),
                closed: false,
                removed: 0,
            }),
            changed: Notify::new(),
            config,
            stats: QueueStats::default(),
        })
    }

    /// Create a queue with the reference delays
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(QueueConfig::new(capacity))
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.items.is_empty()
    }

    pub async fn state(&self) -> QueueState {
        let slots = self.slots.lock().await;
        QueueState::from_len(slots.items.len(), self.config.capacity)
    }

    pub async fn is_closed(&self) -> bool {
        self.slots.lock().await.closed
    }

    /// Copy of the queued items, head first
    pub async fn snapshot(&self) -> Vec<WorkItem> {
        self.slots.lock().await.items.iter().cloned().collect()
    }

    /// Block until there is room, then append `item` at the tail.
    ///
    /// The acceptance delay follows the insert; see `AcceptancePolicy` for
    /// whether the lock is kept during it.
    ///
    /// # Errors
    /// - QueueError::Closed if the queue was closed
    pub async fn submit(&self, item: WorkItem) -> QueueResult<()> {
        self.submit_inner(item, WaitLimits::default()).await
    }

    /// Like `submit`, but gives up with QueueError::Cancelled when `cancel`
    /// fires while blocked
    pub async fn submit_until(&self, item: WorkItem, cancel: &CancelToken) -> QueueResult<()> {
        self.submit_inner(item, WaitLimits::cancellable(cancel)).await
    }

    /// Like `submit`, but gives up with QueueError::TimedOut once `timeout`
    /// elapses without room
    pub async fn submit_timeout(&self, item: WorkItem, timeout: Duration) -> QueueResult<()> {
        self.submit_inner(item, WaitLimits::timeout(timeout)).await
    }

    /// Append `item` only if there is room right now. No acceptance delay.
    pub async fn try_submit(&self, item: WorkItem) -> std::result::Result<(), TrySubmitError> {
        let mut slots = self.slots.lock().await;
        if slots.closed {
            return Err(TrySubmitError::Closed(item));
        }
        if slots.items.len() >= self.config.capacity {
            return Err(TrySubmitError::Full(item));
        }

        let id = item.id();
        slots.items.push_back(item);
        self.stats.record_submit();
        self.changed.notify_waiters();
        debug!(order_id = id, size = slots.items.len(), "Order accepted without waiting");
        Ok(())
    }

    /// Block until an item is queued, then remove and return the head.
    ///
    /// No simulated work; see `take_and_process`.
    ///
    /// # Errors
    /// - QueueError::Closed once the queue is closed and drained
    pub async fn take(&self) -> QueueResult<WorkItem> {
        self.take_inner(WaitLimits::default())
            .await
            .map(|(item, _)| item)
    }

    pub async fn take_until(&self, cancel: &CancelToken) -> QueueResult<WorkItem> {
        self.take_inner(WaitLimits::cancellable(cancel))
            .await
            .map(|(item, _)| item)
    }

    pub async fn take_timeout(&self, timeout: Duration) -> QueueResult<WorkItem> {
        self.take_inner(WaitLimits::timeout(timeout))
            .await
            .map(|(item, _)| item)
    }

    /// Remove the head only if one is queued right now
    pub async fn try_take(&self) -> Option<WorkItem> {
        let mut slots = self.slots.lock().await;
        let (item, _) = self.remove_head(&mut slots)?;
        Some(item)
    }

    /// Remove the head (blocking while empty), then simulate fulfilling it.
    ///
    /// The lock is released before the simulated work starts, so other
    /// consumers keep draining meanwhile. Dropping the returned future after
    /// the head was removed forfeits that item; use `take_and_process_until`
    /// to get it back on cancellation.
    ///
    /// # Errors
    /// - QueueError::Closed once the queue is closed and drained
    pub async fn take_and_process(&self) -> QueueResult<ProcessedItem> {
        self.take_and_process_inner(WaitLimits::default()).await
    }

    /// Like `take_and_process`, observing `cancel`.
    ///
    /// # Errors
    /// - QueueError::Cancelled if cancelled while waiting (queue untouched)
    /// - QueueError::Interrupted if cancelled during processing; carries the
    ///   removed item so it is not lost
    pub async fn take_and_process_until(&self, cancel: &CancelToken) -> QueueResult<ProcessedItem> {
        self.take_and_process_inner(WaitLimits::cancellable(cancel))
            .await
    }

    /// Like `take_and_process`; the timeout only bounds the wait for an item
    pub async fn take_and_process_timeout(&self, timeout: Duration) -> QueueResult<ProcessedItem> {
        self.take_and_process_inner(WaitLimits::timeout(timeout))
            .await
    }

    /// Stop accepting new items and wake every waiter.
    ///
    /// Blocked producers fail with QueueError::Closed. Consumers keep draining
    /// what is queued and fail with Closed once it is empty.
    pub async fn close(&self) {
        let mut slots = self.slots.lock().await;
        if slots.closed {
            return;
        }
        slots.closed = true;
        self.changed.notify_waiters();
        info!(remaining = slots.items.len(), "Queue closed");
    }

    async fn submit_inner(&self, item: WorkItem, limits: WaitLimits<'_>) -> QueueResult<()> {
        let capacity = self.config.capacity;
        let mut slots = self
            .lock_when(limits, Side::Producer, |slots| {
                if slots.closed {
                    return Err(QueueError::Closed);
                }
                Ok(slots.items.len() < capacity)
            })
            .await?;

        let id = item.id();
        slots.items.push_back(item);
        debug_assert!(slots.items.len() <= capacity);
        self.stats.record_submit();
        // Broadcast: producers and consumers alike recheck their condition
        self.changed.notify_waiters();
        info!(order_id = id, size = slots.items.len(), "Producer added order");

        match self.config.acceptance_policy {
            AcceptancePolicy::HoldLock => {
                self.accept(id, limits.cancel).await;
                drop(slots);
            }
            AcceptancePolicy::ReleaseLock => {
                drop(slots);
                self.accept(id, limits.cancel).await;
            }
        }
        Ok(())
    }

    /// The item is committed at this point; cancellation only shortens the delay
    async fn accept(&self, id: u64, cancel: Option<&CancelToken>) {
        if !pause(self.config.acceptance_delay, cancel).await {
            debug!(order_id = id, "Acceptance delay cut short by cancellation");
        }
    }

    async fn take_inner(&self, limits: WaitLimits<'_>) -> QueueResult<(WorkItem, u64)> {
        let mut slots = self
            .lock_when(limits, Side::Consumer, |slots| {
                if !slots.items.is_empty() {
                    return Ok(true);
                }
                if slots.closed {
                    return Err(QueueError::Closed);
                }
                Ok(false)
            })
            .await?;

        self.remove_head(&mut slots).ok_or(QueueError::Closed)
    }

    /// Pop the head under the caller's lock and broadcast the freed slot
    fn remove_head(&self, slots: &mut Slots) -> Option<(WorkItem, u64)> {
        let item = slots.items.pop_front()?;
        slots.removed += 1;
        self.stats.record_take();
        self.changed.notify_waiters();
        Some((item, slots.removed))
    }

    async fn take_and_process_inner(&self, limits: WaitLimits<'_>) -> QueueResult<ProcessedItem> {
        let (item, sequence) = self.take_inner(limits).await?;
        let delay = self.config.processing_delay(item.quantity());
        info!(order_id = item.id(), %item, "Starting order");

        let started = Instant::now();
        if !pause(delay, limits.cancel).await {
            warn!(order_id = item.id(), "Order processing interrupted");
            return Err(QueueError::Interrupted(item));
        }
        let elapsed = started.elapsed();

        info!(
            order_id = item.id(),
            elapsed_ms = elapsed_millis(elapsed),
            "Fulfilled order"
        );
        Ok(ProcessedItem {
            item,
            sequence,
            elapsed,
        })
    }

    /// Acquire the lock once `ready` holds, parking on the notifier otherwise.
    ///
    /// `ready` returns Ok(false) to keep waiting and Err to give up.
    async fn lock_when<F>(
        &self,
        limits: WaitLimits<'_>,
        side: Side,
        ready: F,
    ) -> QueueResult<MutexGuard<'_, Slots>>
    where
        F: Fn(&Slots) -> QueueResult<bool>,
    {
        let deadline = limits.timeout.map(|timeout| Instant::now() + timeout);
        let timed_out = || QueueError::TimedOut(limits.timeout.unwrap_or_default());

        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let slots = tokio::select! {
                biased;
                slots = self.slots.lock() => slots,
                _ = cancelled(limits.cancel) => return Err(QueueError::Cancelled),
                _ = expired(deadline) => return Err(timed_out()),
            };
            if ready(&*slots)? {
                return Ok(slots);
            }

            let size = slots.items.len();
            drop(slots);
            self.stats.record_wait(side);
            match side {
                Side::Producer => info!(
                    size,
                    capacity = self.config.capacity,
                    "Warehouse at capacity, producer waiting"
                ),
                Side::Consumer => info!("No orders queued, consumer waiting"),
            }

            tokio::select! {
                biased;
                _ = &mut notified => {}
                _ = cancelled(limits.cancel) => {
                    debug!("Wait cancelled");
                    return Err(QueueError::Cancelled);
                }
                _ = expired(deadline) => return Err(timed_out()),
            }
        }
    }
}

/// Whole milliseconds in `duration`, saturating at u64::MAX
pub fn elapsed_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Sleep for `delay` unless cancelled first; returns false when cancelled
async fn pause(delay: Duration, cancel: Option<&CancelToken>) -> bool {
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = cancelled(cancel) => false,
    }
}

async fn cancelled(cancel: Option<&CancelToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
