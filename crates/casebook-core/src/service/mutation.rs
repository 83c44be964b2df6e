// ── Write queue ──
//
// Every write to a collection travels through one mpsc channel to a
// single processor task, so writes apply strictly in the order they were
// sent. Each caller gets its own result back on a oneshot.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{EntityId, Record};
use crate::store::EntityCollection;

/// In-place edit applied to a private copy of the stored record.
pub(crate) type EditFn<T> = Box<dyn FnOnce(&mut T, DateTime<Utc>) -> Result<(), CoreError> + Send>;

/// A single write against one collection.
pub(crate) enum Mutation<T: Record> {
    Create(T::Draft),
    Modify {
        id: EntityId,
        /// Optimistic-concurrency guard. `None` writes unconditionally.
        expected_revision: Option<u64>,
        /// Short verb for logs (`"update"`, `"transition"`).
        op: &'static str,
        edit: EditFn<T>,
    },
    Remove(EntityId),
    Reset(Vec<T>),
}

impl<T: Record> fmt::Debug for Mutation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(_) => f.write_str("Create"),
            Self::Modify {
                id,
                expected_revision,
                op,
                ..
            } => f
                .debug_struct("Modify")
                .field("id", id)
                .field("expected_revision", expected_revision)
                .field("op", op)
                .finish_non_exhaustive(),
            Self::Remove(id) => f.debug_tuple("Remove").field(id).finish(),
            Self::Reset(items) => f.debug_tuple("Reset").field(&items.len()).finish(),
        }
    }
}

/// What a mutation did.
#[derive(Debug)]
pub(crate) enum Applied<T> {
    Stored(Arc<T>),
    Removed(bool),
    Replaced(usize),
}

/// A mutation plus the channel its result goes back on.
pub(crate) struct WriteEnvelope<T: Record> {
    pub mutation: Mutation<T>,
    pub response_tx: oneshot::Sender<Result<Applied<T>, CoreError>>,
}

/// Drain the write queue until cancelled or every sender is gone.
pub(crate) async fn write_processor_task<T: Record>(
    collection: Arc<EntityCollection<T>>,
    mut rx: mpsc::Receiver<WriteEnvelope<T>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = apply_mutation(&collection, envelope.mutation, Utc::now());
                let _ = envelope.response_tx.send(result);
            }
        }
    }
    debug!(entity = T::KIND, "write processor stopped");
}

/// Apply one mutation. A failed mutation leaves the collection untouched:
/// edits run on a clone that is only committed on success.
pub(crate) fn apply_mutation<T: Record>(
    collection: &EntityCollection<T>,
    mutation: Mutation<T>,
    now: DateTime<Utc>,
) -> Result<Applied<T>, CoreError> {
    match mutation {
        Mutation::Create(draft) => {
            let record = T::from_draft(EntityId::generate(), draft, now)?;
            let (stored, _) = collection.upsert(record);
            debug!(entity = T::KIND, id = %stored.id(), "created");
            Ok(Applied::Stored(stored))
        }
        Mutation::Modify {
            id,
            expected_revision,
            op,
            edit,
        } => {
            let (current, revision) = collection
                .get_with_revision(&id)
                .ok_or_else(|| CoreError::not_found(T::KIND, &id))?;
            if let Some(expected) = expected_revision {
                if expected != revision {
                    return Err(CoreError::ConcurrencyConflict {
                        entity_type: T::KIND.into(),
                        identifier: id.to_string(),
                        expected,
                        actual: revision,
                    });
                }
            }
            let mut next = T::clone(&current);
            edit(&mut next, now)?;
            next.touch(now);
            let (stored, revision) = collection.upsert(next);
            debug!(entity = T::KIND, %id, op, revision, "modified");
            Ok(Applied::Stored(stored))
        }
        Mutation::Remove(id) => {
            let removed = collection.remove(&id).is_some();
            debug!(entity = T::KIND, %id, removed, "remove");
            Ok(Applied::Removed(removed))
        }
        Mutation::Reset(items) => {
            ensure_unique_ids(&items)?;
            let count = items.len();
            collection.replace_all(items);
            debug!(entity = T::KIND, count, "collection reset");
            Ok(Applied::Replaced(count))
        }
    }
}

/// Seeds must not reuse an id.
pub(crate) fn ensure_unique_ids<T: Record>(items: &[T]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(CoreError::validation(
                "id",
                format!("duplicate {} id '{}' in seed", T::KIND, item.id()),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Notification, NotificationDraft, NotificationPatch, Priority};

    fn draft(title: &str) -> NotificationDraft {
        NotificationDraft {
            title: title.into(),
            message: String::new(),
            priority: Priority::Normal,
        }
    }

    fn created(collection: &EntityCollection<Notification>, title: &str) -> Arc<Notification> {
        match apply_mutation(collection, Mutation::Create(draft(title)), Utc::now()).unwrap() {
            Applied::Stored(n) => n,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_edit_leaves_record_untouched() {
        let collection = EntityCollection::new();
        let n = created(&collection, "Report due");
        let version = collection.version();

        let result = apply_mutation(
            &collection,
            Mutation::Modify {
                id: n.id.clone(),
                expected_revision: None,
                op: "update",
                edit: Box::new(|r: &mut Notification, _| {
                    r.apply_patch(NotificationPatch {
                        title: Some("   ".into()),
                        ..NotificationPatch::default()
                    })
                }),
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(CoreError::Validation { .. })));
        assert_eq!(collection.get(&n.id).unwrap().title, "Report due");
        assert_eq!(collection.version(), version);
    }

    #[test]
    fn stale_revision_conflicts() {
        let collection = EntityCollection::new();
        let n = created(&collection, "Report due");
        let result = apply_mutation(
            &collection,
            Mutation::Modify {
                id: n.id.clone(),
                expected_revision: Some(7),
                op: "update",
                edit: Box::new(|_: &mut Notification, _| Ok(())),
            },
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(CoreError::ConcurrencyConflict {
                expected: 7,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_seed_ids_rejected() {
        let collection = EntityCollection::<Notification>::new();
        let n = created(&collection, "a");
        let items = vec![Notification::clone(&n), Notification::clone(&n)];
        let result = apply_mutation(&collection, Mutation::Reset(items), Utc::now());
        assert!(matches!(result, Err(CoreError::Validation { .. })));
        assert_eq!(collection.len(), 1);
    }
}
