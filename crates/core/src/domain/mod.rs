// Domain Layer - Pure values and errors

pub mod error;
pub mod item;
pub mod queue;

// Re-exports
pub use error::{QueueError, TrySubmitError};
pub use item::{Category, ItemId, WorkItem};
pub use queue::{AcceptancePolicy, QueueConfig, QueueState};
