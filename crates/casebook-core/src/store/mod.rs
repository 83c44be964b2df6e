// ── Reactive record storage ──
//
// One `EntityCollection` per DataService. Readers take versioned
// snapshots; writers are serialized by the owning service.

mod collection;

use std::sync::Arc;

pub(crate) use collection::EntityCollection;

/// A point-in-time view of a collection.
///
/// `version` increments on every mutation, so `(version, QueryState)` is a
/// valid memoization key for derived views.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub version: u64,
    pub items: Arc<Vec<Arc<T>>>,
}

impl<T> Snapshot<T> {
    pub(crate) fn empty() -> Self {
        Self {
            version: 0,
            items: Arc::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            items: Arc::clone(&self.items),
        }
    }
}
