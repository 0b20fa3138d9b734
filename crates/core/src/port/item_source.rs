// Item Source Port (work item generation)

use crate::domain::{Category, ItemId, WorkItem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Exclusive upper bound for generated quantities (0..100)
pub const MAX_RANDOM_QUANTITY: u32 = 100;

/// Work item generator interface.
///
/// Implementations assign ids at generation time, so id order is fixed
/// before any item reaches the queue.
pub trait ItemSource: Send {
    /// Produce the next item, or None once the source is exhausted
    fn next_item(&mut self) -> Option<WorkItem>;

    /// Generate up to `count` items up front
    fn generate(&mut self, count: usize) -> Vec<WorkItem> {
        let mut items = Vec::with_capacity(count);
        while items.len() < count {
            match self.next_item() {
                Some(item) => items.push(item),
                None => break,
            }
        }
        items
    }
}

/// Random orders: uniform category, quantity in 0..MAX_RANDOM_QUANTITY (production)
pub struct RandomItemSource {
    next_id: ItemId,
    rng: StdRng,
}

impl RandomItemSource {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            next_id: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomItemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemSource for RandomItemSource {
    fn next_item(&mut self) -> Option<WorkItem> {
        let id = self.next_id;
        self.next_id += 1;
        let category = Category::ALL[self.rng.gen_range(0..Category::ALL.len())];
        let quantity = self.rng.gen_range(0..MAX_RANDOM_QUANTITY);
        Some(WorkItem::new(id, category, quantity))
    }
}

/// Deterministic orders from a fixed quantity list; categories cycle (tests, demos)
pub struct FixedItemSource {
    next_id: ItemId,
    quantities: std::vec::IntoIter<u32>,
}

impl FixedItemSource {
    pub fn new(quantities: Vec<u32>) -> Self {
        Self {
            next_id: 1,
            quantities: quantities.into_iter(),
        }
    }

    /// `count` orders of the same quantity
    pub fn uniform(count: usize, quantity: u32) -> Self {
        Self::new(vec![quantity; count])
    }
}

impl ItemSource for FixedItemSource {
    fn next_item(&mut self) -> Option<WorkItem> {
        let quantity = self.quantities.next()?;
        let id = self.next_id;
        self.next_id += 1;
        let category = Category::ALL[(id as usize - 1) % Category::ALL.len()];
        Some(WorkItem::new(id, category, quantity))
    }
}
