// ── Generic reactive entity collection ──
//
// Concurrent storage with O(1) id lookups and push-based change
// notification via a `watch` channel. Insertion order is remembered only
// to give the list pipeline a deterministic pre-sort order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::watch;

use super::Snapshot;
use crate::model::{EntityId, Record};

struct Slot<T> {
    /// Insertion sequence; survives updates, reset by re-insertion.
    seq: u64,
    /// Per-record write counter, starts at 1.
    revision: u64,
    value: Arc<T>,
}

/// A reactive collection for a single record type.
///
/// Every mutation bumps the collection version and rebuilds the snapshot
/// that subscribers receive.
pub(crate) struct EntityCollection<T: Record> {
    by_id: DashMap<EntityId, Slot<T>>,
    next_seq: AtomicU64,
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Record> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Snapshot::empty());
        Self {
            by_id: DashMap::new(),
            next_seq: AtomicU64::new(0),
            snapshot,
        }
    }

    /// Insert or replace a record keyed by its own id.
    ///
    /// Returns the stored record and its new revision.
    pub(crate) fn upsert(&self, entity: T) -> (Arc<T>, u64) {
        let id = entity.id().clone();
        let value = Arc::new(entity);
        let revision = match self.by_id.get_mut(&id) {
            Some(mut slot) => {
                slot.revision += 1;
                slot.value = Arc::clone(&value);
                slot.revision
            }
            None => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                self.by_id.insert(
                    id,
                    Slot {
                        seq,
                        revision: 1,
                        value: Arc::clone(&value),
                    },
                );
                1
            }
        };
        self.publish();
        (value, revision)
    }

    /// Remove a record. Returns it if it existed.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let removed = self.by_id.remove(id).map(|(_, slot)| slot.value);
        if removed.is_some() {
            self.publish();
        }
        removed
    }

    /// Replace the whole contents in one published step.
    pub(crate) fn replace_all(&self, items: Vec<T>) {
        self.by_id.clear();
        for entity in items {
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            self.by_id.insert(
                entity.id().clone(),
                Slot {
                    seq,
                    revision: 1,
                    value: Arc::new(entity),
                },
            );
        }
        self.publish();
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|slot| Arc::clone(&slot.value))
    }

    pub(crate) fn get_with_revision(&self, id: &EntityId) -> Option<(Arc<T>, u64)> {
        self.by_id
            .get(id)
            .map(|slot| (Arc::clone(&slot.value), slot.revision))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        self.snapshot.borrow().version
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Rebuild the ordered snapshot, bump the version and broadcast.
    fn publish(&self) {
        let mut ordered: Vec<(u64, Arc<T>)> = self
            .by_id
            .iter()
            .map(|r| (r.value().seq, Arc::clone(&r.value().value)))
            .collect();
        ordered.sort_unstable_by_key(|(seq, _)| *seq);
        let items: Vec<Arc<T>> = ordered.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| {
            snap.version += 1;
            snap.items = Arc::new(items);
        });
    }
}
