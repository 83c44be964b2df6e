// ── Derived-view memoization ──

use super::pipeline::{DerivedView, ListQuery};
use super::state::QueryState;
use crate::model::Record;
use crate::store::Snapshot;

/// Remembers the last view derived for one list.
///
/// Keyed on `(snapshot version, QueryState)`: any write to the collection
/// or any change to the state forces a fresh derivation.
#[derive(Debug)]
pub struct ViewCache<T> {
    entry: Option<CacheEntry<T>>,
    hits: u64,
    misses: u64,
}

#[derive(Debug)]
struct CacheEntry<T> {
    version: u64,
    state: QueryState,
    view: DerivedView<T>,
}

impl<T> Default for ViewCache<T> {
    fn default() -> Self {
        Self {
            entry: None,
            hits: 0,
            misses: 0,
        }
    }
}

impl<T: Record> ViewCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(
        &mut self,
        query: &ListQuery<T>,
        snapshot: &Snapshot<T>,
        state: &QueryState,
    ) -> DerivedView<T> {
        if let Some(entry) = &self.entry {
            if entry.version == snapshot.version && entry.state == *state {
                self.hits += 1;
                return entry.view.clone();
            }
        }
        self.misses += 1;
        let view = query.derive(&snapshot.items, state);
        self.entry = Some(CacheEntry {
            version: snapshot.version,
            state: state.clone(),
            view: view.clone(),
        });
        view
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
