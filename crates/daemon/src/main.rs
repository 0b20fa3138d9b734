//! OrderQueue - Main Entry Point
//! One producer, N consumers, one bounded FIFO queue

mod config;
mod telemetry;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{Args, ReportFormat, Settings};
use std::sync::Arc;
use tracing::{info, warn};

use orderqueue_core::application::run::{self, RunPlan};
use orderqueue_core::application::worker::constants::SHUTDOWN_GRACE_PERIOD;
use orderqueue_core::application::cancel_channel;
use orderqueue_core::port::{ItemSource, RandomItemSource};
use orderqueue_core::BoundedOrderQueue;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration & initialize logging
    let args = Args::parse();
    telemetry::init_logging(args.log_format)?;

    info!("OrderQueue v{} starting...", VERSION);

    let settings = Settings::from_args(&args)?;

    // 2. Setup dependencies (DI wiring)
    let queue = Arc::new(
        BoundedOrderQueue::new(settings.queue.clone()).context("Queue creation failed")?,
    );
    let source: Box<dyn ItemSource> = match settings.seed {
        Some(seed) => Box::new(RandomItemSource::seeded(seed)),
        None => Box::new(RandomItemSource::new()),
    };
    let plan = RunPlan {
        orders: settings.orders,
        consumers: settings.consumers,
        orders_per_consumer: Some(settings.orders_per_consumer),
    };

    // 3. Start producer + consumers
    let (cancel_tx, cancel) = cancel_channel();
    let mut run_handle = tokio::spawn(run::execute(queue.clone(), source, plan, cancel));

    // 4. Wait for the fixed counts to finish, or Ctrl+C
    let finished = tokio::select! {
        joined = &mut run_handle => Some(joined),
        _ = tokio::signal::ctrl_c() => None,
    };
    let joined = match finished {
        Some(joined) => joined,
        None => {
            info!("Shutdown signal received. Stopping drivers...");
            cancel_tx.cancel();
            queue.close().await;
            match tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, run_handle).await {
                Ok(joined) => joined,
                Err(_) => bail!("drivers did not stop within {:?}", SHUTDOWN_GRACE_PERIOD),
            }
        }
    };
    let report = joined.context("Run task failed")??;

    // 5. Report
    if let Err(e) = report.verify() {
        warn!(error = %e, "Run report failed verification");
    }
    match settings.report {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }

    info!("Shutdown complete.");
    Ok(())
}
