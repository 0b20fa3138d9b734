// Application Layer - Queue core and the drivers around it

pub mod cancel;
pub mod order_queue;
pub mod producer;
pub mod report;
pub mod run;
pub mod worker;

// Re-exports
pub use cancel::{cancel_channel, CancelSender, CancelToken};
pub use order_queue::{BoundedOrderQueue, ProcessedItem, StatsSnapshot};
pub use producer::{Producer, ProducerSummary};
pub use report::{RunReport, StopReason};
pub use run::{execute, RunPlan};
pub use worker::{Consumer, ConsumerSummary, FulfilledOrder};
