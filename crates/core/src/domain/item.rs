// Work Item Domain Model

use serde::{Deserialize, Serialize};

/// Work item ID (strictly increasing, assigned at generation time)
pub type ItemId = u64;

/// Product category of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hiking,
    Sneakers,
    Running,
}

impl Category {
    /// Fixed label set the generators draw from
    pub const ALL: [Category; 3] = [Category::Hiking, Category::Sneakers, Category::Running];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hiking => "hiking",
            Category::Sneakers => "sneakers",
            Category::Running => "running",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work item ("order") flowing from the producer to a consumer.
///
/// Immutable once built: fields are only readable through accessors, and the
/// queue hands items out by value so a consumer never aliases queue storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    id: ItemId,
    category: Category,
    quantity: u32,
}

impl WorkItem {
    pub fn new(id: ItemId, category: Category, quantity: u32) -> Self {
        Self {
            id,
            category,
            quantity,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Units ordered; drives the simulated processing cost
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order[id={}, type={}, quantity={}]",
            self.id, self.category, self.quantity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Sneakers).unwrap();
        assert_eq!(json, "\"sneakers\"");

        let back: Category = serde_json::from_str("\"hiking\"").unwrap();
        assert_eq!(back, Category::Hiking);
    }

    #[test]
    fn test_work_item_display() {
        let item = WorkItem::new(7, Category::Running, 42);
        assert_eq!(item.to_string(), "Order[id=7, type=running, quantity=42]");
    }

    #[test]
    fn test_clone_is_independent_value() {
        let original = WorkItem::new(1, Category::Hiking, 5);
        let copy = original.clone();
        drop(original);
        assert_eq!(copy.id(), 1);
        assert_eq!(copy.quantity(), 5);
    }
}
