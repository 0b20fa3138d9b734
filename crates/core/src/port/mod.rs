// Port Layer - Interfaces for external collaborators

pub mod item_source;

// Re-exports
pub use item_source::{FixedItemSource, ItemSource, RandomItemSource};
