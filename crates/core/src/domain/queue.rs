// Queue Domain Model

use std::time::Duration;

/// Time to accept an order on the producer side (200ms)
pub const DEFAULT_ACCEPTANCE_DELAY: Duration = Duration::from_millis(200);

/// Fixed part of the simulated fulfilment time (200ms)
pub const DEFAULT_BASE_PROCESSING_DELAY: Duration = Duration::from_millis(200);

/// Additional fulfilment time per ordered unit (30ms)
pub const DEFAULT_PER_UNIT_DELAY: Duration = Duration::from_millis(30);

/// Occupancy of a queue, derived from its length and capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Empty,
    Partial,
    Full,
}

impl QueueState {
    pub fn from_len(len: usize, capacity: usize) -> Self {
        if len == 0 {
            QueueState::Empty
        } else if len >= capacity {
            QueueState::Full
        } else {
            QueueState::Partial
        }
    }
}

impl std::fmt::Display for QueueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueState::Empty => write!(f, "EMPTY"),
            QueueState::Partial => write!(f, "PARTIAL"),
            QueueState::Full => write!(f, "FULL"),
        }
    }
}

/// Whether `submit` keeps the queue lock during the acceptance delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptancePolicy {
    /// Lock held for the whole submit, delay included. Serializes every other
    /// queue operation behind the acceptance delay.
    #[default]
    HoldLock,
    /// Lock released once the item is enqueued; consumers drain during the delay
    ReleaseLock,
}

/// Queue configuration
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub capacity: usize,
    pub acceptance_delay: Duration,
    pub base_processing_delay: Duration,
    pub per_unit_delay: Duration,
    pub acceptance_policy: AcceptancePolicy,
}

impl QueueConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            acceptance_delay: DEFAULT_ACCEPTANCE_DELAY,
            base_processing_delay: DEFAULT_BASE_PROCESSING_DELAY,
            per_unit_delay: DEFAULT_PER_UNIT_DELAY,
            acceptance_policy: AcceptancePolicy::default(),
        }
    }

    /// Configuration with every simulated delay set to zero (for tests)
    pub fn instant(capacity: usize) -> Self {
        Self::new(capacity)
            .with_acceptance_delay(Duration::ZERO)
            .with_processing_delay(Duration::ZERO, Duration::ZERO)
    }

    pub fn with_acceptance_delay(mut self, delay: Duration) -> Self {
        self.acceptance_delay = delay;
        self
    }

    pub fn with_processing_delay(mut self, base: Duration, per_unit: Duration) -> Self {
        self.base_processing_delay = base;
        self.per_unit_delay = per_unit;
        self
    }

    pub fn with_acceptance_policy(mut self, policy: AcceptancePolicy) -> Self {
        self.acceptance_policy = policy;
        self
    }

    /// Simulated fulfilment time: base + quantity * per_unit
    pub fn processing_delay(&self, quantity: u32) -> Duration {
        self.base_processing_delay
            .saturating_add(self.per_unit_delay.saturating_mul(quantity))
    }
}
