// Domain Error Types

use crate::domain::WorkItem;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by blocking queue operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Cancelled while blocked; the queue was not touched
    #[error("Operation cancelled while waiting")]
    Cancelled,

    /// Cancelled during simulated processing; the removed item is handed back
    #[error("Processing interrupted: {0}")]
    Interrupted(WorkItem),

    #[error("Timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Queue closed")]
    Closed,
}

/// Error returned by `try_submit`, carrying the rejected item back
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrySubmitError {
    #[error("Queue full, rejected {0}")]
    Full(WorkItem),

    #[error("Queue closed, rejected {0}")]
    Closed(WorkItem),
}

impl TrySubmitError {
    pub fn into_item(self) -> WorkItem {
        match self {
            TrySubmitError::Full(item) | TrySubmitError::Closed(item) => item,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueueError>;
