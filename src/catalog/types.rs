//! Normalized internal types handed to the engine (provider-agnostic).

use serde::Serialize;

/// Named upstream subdivision of the catalog (a cuisine category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub id: String,
    pub label: String,
    pub thumbnail: String,
    pub description: String,
}

impl Partition {
    pub fn named(name: &str) -> Self {
        Self {
            id: name.to_string(),
            label: name.to_string(),
            thumbnail: String::new(),
            description: String::new(),
        }
    }
}

/// Minimal reference to an item, only used to drive hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub item_id: String,
    pub partition_id: String,
}

impl Summary {
    pub fn new(item_id: impl Into<String>, partition_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            partition_id: partition_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub name: String,
    pub measure: String,
}

/// Fully hydrated item. Identity is `item_id`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DetailRecord {
    pub item_id: String,
    pub title: String,
    pub category: String,
    pub area: String,
    pub instructions: String,
    pub thumbnail: String,
    pub tags: Vec<String>,
    pub youtube: String,
    pub source: String,
    pub ingredients: Vec<Ingredient>,
    /// Partition the item was pulled from. Set by the hydrator.
    pub partition_id: String,
    /// Position in the feed. Set when merged.
    pub sequence_index: usize,
}

impl DetailRecord {
    /// Instructions split into non-blank steps.
    pub fn instruction_steps(&self) -> Vec<&str> {
        self.instructions
            .lines()
            .map(|step| step.trim())
            .filter(|step| !step.is_empty())
            .collect()
    }
}
