// OrderQueue Core - Bounded FIFO queue, drivers & ports
// NO CLI or subscriber setup here; the daemon crate is the composition root

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::order_queue::{BoundedOrderQueue, ProcessedItem};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
