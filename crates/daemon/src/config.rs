//! Run configuration: CLI flags with `ORDERQUEUE_*` environment fallbacks

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use orderqueue_core::application::worker::constants::{
    DEFAULT_CAPACITY, DEFAULT_CONSUMER_COUNT, DEFAULT_ORDERS_PER_CONSUMER, DEFAULT_ORDER_COUNT,
};
use orderqueue_core::domain::{AcceptancePolicy, QueueConfig};
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Development: pretty formatting with colors
    Pretty,
    /// Production: JSON structured logging
    Json,
}

/// Final report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "orderqueue")]
#[command(about = "Bounded FIFO order queue: one producer, N consumers", long_about = None)]
#[command(version)]
pub struct Args {
    /// Orders the warehouse holds before the producer blocks
    #[arg(long, env = "ORDERQUEUE_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Orders the producer generates
    #[arg(long, env = "ORDERQUEUE_ORDERS", default_value_t = DEFAULT_ORDER_COUNT)]
    pub orders: usize,

    /// Orders each consumer fulfils before stopping
    #[arg(long, env = "ORDERQUEUE_ORDERS_PER_CONSUMER", default_value_t = DEFAULT_ORDERS_PER_CONSUMER)]
    pub orders_per_consumer: usize,

    /// Consumer workers to start
    #[arg(long, env = "ORDERQUEUE_CONSUMERS", default_value_t = DEFAULT_CONSUMER_COUNT)]
    pub consumers: usize,

    /// Simulated time to accept an order (ms)
    #[arg(long, env = "ORDERQUEUE_ACCEPTANCE_DELAY_MS", default_value_t = 200)]
    pub acceptance_delay_ms: u64,

    /// Fixed part of the simulated fulfilment time (ms)
    #[arg(long, env = "ORDERQUEUE_BASE_DELAY_MS", default_value_t = 200)]
    pub base_delay_ms: u64,

    /// Fulfilment time added per ordered unit (ms)
    #[arg(long, env = "ORDERQUEUE_PER_UNIT_DELAY_MS", default_value_t = 30)]
    pub per_unit_delay_ms: u64,

    /// Release the queue lock before the acceptance delay
    #[arg(long, env = "ORDERQUEUE_RELEASE_LOCK")]
    pub release_lock_during_acceptance: bool,

    /// Seed for reproducible order generation
    #[arg(long, env = "ORDERQUEUE_SEED")]
    pub seed: Option<u64>,

    #[arg(long, env = "ORDERQUEUE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub report: ReportFormat,
}

/// Validated run settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub queue: QueueConfig,
    pub orders: usize,
    pub orders_per_consumer: usize,
    pub consumers: usize,
    pub seed: Option<u64>,
    pub report: ReportFormat,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self> {
        if args.capacity == 0 {
            bail!("capacity must be greater than 0");
        }
        if args.consumers == 0 {
            bail!("at least one consumer is required");
        }
        // Fixed iteration counts on both sides: a mismatch would leave a
        // driver blocked forever
        let demand = args.consumers.checked_mul(args.orders_per_consumer);
        if demand != Some(args.orders) {
            bail!(
                "{} consumers x {} orders each does not match {} produced orders",
                args.consumers,
                args.orders_per_consumer,
                args.orders
            );
        }

        let policy = if args.release_lock_during_acceptance {
            AcceptancePolicy::ReleaseLock
        } else {
            AcceptancePolicy::HoldLock
        };
        let queue = QueueConfig::new(args.capacity)
            .with_acceptance_delay(Duration::from_millis(args.acceptance_delay_ms))
            .with_processing_delay(
                Duration::from_millis(args.base_delay_ms),
                Duration::from_millis(args.per_unit_delay_ms),
            )
            .with_acceptance_policy(policy);

        Ok(Self {
            queue,
            orders: args.orders,
            orders_per_consumer: args.orders_per_consumer,
            consumers: args.consumers,
            seed: args.seed,
            report: args.report,
        })
    }
}
