// Run constants (no magic values)
use std::time::Duration;

/// Reference warehouse capacity (orders in flight)
pub const DEFAULT_CAPACITY: usize = 3;

/// Orders the producer generates per run
pub const DEFAULT_ORDER_COUNT: usize = 10;

/// Orders each consumer fulfils before stopping
pub const DEFAULT_ORDERS_PER_CONSUMER: usize = 5;

/// Consumer workers started per run
pub const DEFAULT_CONSUMER_COUNT: usize = 2;

/// How long shutdown waits for drivers to finish after Ctrl+C (5 seconds)
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);
