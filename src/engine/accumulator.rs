use crate::catalog::types::DetailRecord;
use std::collections::HashSet;

/// Append `incoming` records whose `item_id` is not already present.
///
/// Arrival order is kept and each appended record gets its feed position as
/// `sequence_index`. Duplicates, whether against `existing` or within
/// `incoming`, are dropped silently. Pure: `merge(merge(a, b), b) == merge(a, b)`.
pub fn merge(existing: &[DetailRecord], incoming: &[DetailRecord]) -> Vec<DetailRecord> {
    let mut seen: HashSet<&str> = existing.iter().map(|r| r.item_id.as_str()).collect();
    let mut merged = existing.to_vec();
    for record in incoming {
        if !seen.insert(record.item_id.as_str()) {
            continue;
        }
        let mut record = record.clone();
        record.sequence_index = merged.len();
        merged.push(record);
    }
    merged
}
