use std::collections::HashMap;

/// Per-partition count of summaries already consumed.
///
/// Counts only grow. Once a partition's size has been observed, counts are
/// clamped to it.
pub struct PartitionCursorSet {
    consumed: HashMap<String, usize>, // partition id -> consumed count
    known_sizes: HashMap<String, usize>,
}

impl Default for PartitionCursorSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionCursorSet {
    pub fn new() -> Self {
        Self {
            consumed: HashMap::new(),
            known_sizes: HashMap::new(),
        }
    }

    /// Consumed count, 0 for partitions never touched.
    pub fn consumed_count(&self, partition_id: &str) -> usize {
        self.consumed.get(partition_id).copied().unwrap_or(0)
    }

    /// Record the latest full membership size of a partition.
    pub fn observe_size(&mut self, partition_id: &str, total: usize) {
        self.known_sizes.insert(partition_id.to_string(), total);
    }

    /// Advance the cursor by `by`, clamped at the known size. Never decreases.
    pub fn advance(&mut self, partition_id: &str, by: usize) -> usize {
        let limit = self.known_sizes.get(partition_id).copied();
        let count = self.consumed.entry(partition_id.to_string()).or_insert(0);
        let mut next = count.saturating_add(by);
        if let Some(limit) = limit {
            next = next.min(limit);
        }
        // A shrunken partition must not pull the cursor backwards.
        *count = next.max(*count);
        *count
    }
}
