// ── Aggregate counts ──
//
// Badge and stat-card numbers. Always computed over the full collection,
// never over a filtered view.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{FieldValue, Record};

/// Count records per key.
pub fn group_count<T, K, F>(records: &[Arc<T>], key_fn: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key_fn(record)).or_insert(0) += 1;
    }
    counts
}

/// Count records per rendered value of `field`.
///
/// Records without the field are not counted. A list field counts once
/// under each of its elements.
pub fn count_by_field<T: Record>(records: &[Arc<T>], field: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in records.iter().filter_map(|r| r.field(field)) {
        match value {
            FieldValue::List(items) => {
                for item in items {
                    *counts.entry(item.to_string()).or_insert(0) += 1;
                }
            }
            scalar => *counts.entry(scalar.to_string()).or_insert(0) += 1,
        }
    }
    counts
}
