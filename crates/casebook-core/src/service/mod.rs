// ── DataService ──
//
// One in-memory collection behind an async CRUD surface that behaves like
// a remote resource: every call pays a simulated latency, writes are
// serialized through a queue, lifecycle transitions are checked centrally.

mod mutation;
mod sequencer;

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::error::CoreError;
use crate::model::{EntityId, Lifecycle, Record, TransitionPayload, apply_transition};
use crate::query::{FilterSet, QueryState};
use crate::store::{EntityCollection, Snapshot};
use crate::stream::EntityStream;

use mutation::{Applied, Mutation, WriteEnvelope, write_processor_task};

pub(crate) use mutation::ensure_unique_ids;

pub use sequencer::{RequestSequencer, Ticket};

/// Result of [`DataService::list`].
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    pub data: Vec<Arc<T>>,
    pub total: usize,
    /// Collection version the data was read at.
    pub version: u64,
}

// ── DataService ──────────────────────────────────────────────────────

/// Async CRUD over one record collection.
///
/// Cheaply cloneable via `Arc`. Construct with [`new`](Self::new), then
/// [`init`](Self::init) to load a seed and start the write processor.
/// Reads work in any state; writes fail with
/// [`CoreError::ServiceStopped`] until `init` and after
/// [`shutdown`](Self::shutdown).
pub struct DataService<T: Record> {
    inner: Arc<ServiceInner<T>>,
}

impl<T: Record> Clone for DataService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ServiceInner<T: Record> {
    config: ServiceConfig,
    collection: Arc<EntityCollection<T>>,
    runtime: Mutex<Option<Runtime<T>>>,
}

/// The running write processor.
struct Runtime<T: Record> {
    write_tx: mpsc::Sender<WriteEnvelope<T>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<T: Record> Runtime<T> {
    fn spawn(collection: Arc<EntityCollection<T>>, queue_size: usize) -> Self {
        let (write_tx, write_rx) = mpsc::channel(queue_size.max(1));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(write_processor_task(collection, write_rx, cancel.clone()));
        Self {
            write_tx,
            cancel,
            handle,
        }
    }
}

impl<T: Record> DataService<T> {
    /// Create an empty, stopped service. Does no I/O and spawns nothing.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                config,
                collection: Arc::new(EntityCollection::new()),
                runtime: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    /// A fresh list state sized by the configured default page size.
    pub fn query_state(&self) -> QueryState {
        QueryState::with_page_size(self.inner.config.default_page_size)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load `seed` and start accepting writes.
    ///
    /// On a service that is already running this is a [`reset`](Self::reset).
    pub async fn init(&self, seed: Vec<T>) -> Result<(), CoreError> {
        ensure_unique_ids(&seed)?;
        let mut runtime = self.inner.runtime.lock().await;
        if runtime.is_some() {
            drop(runtime);
            return self.reset(seed).await;
        }
        let count = seed.len();
        self.inner.collection.replace_all(seed);
        *runtime = Some(Runtime::spawn(
            Arc::clone(&self.inner.collection),
            self.inner.config.write_queue_size,
        ));
        info!(entity = T::KIND, records = count, "service started");
        Ok(())
    }

    /// Replace the whole collection. Queued behind any earlier writes.
    pub async fn reset(&self, seed: Vec<T>) -> Result<(), CoreError> {
        match self.write(Mutation::Reset(seed)).await? {
            Applied::Replaced(count) => {
                info!(entity = T::KIND, records = count, "service reset");
                Ok(())
            }
            other => Err(unexpected(&other)),
        }
    }

    /// Stop the write processor. Writes still queued resolve with
    /// [`CoreError::ServiceStopped`]. Idempotent.
    pub async fn shutdown(&self) {
        let Some(runtime) = self.inner.runtime.lock().await.take() else {
            return;
        };
        runtime.cancel.cancel();
        let _ = runtime.handle.await;
        info!(entity = T::KIND, "service stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.inner.runtime.lock().await.is_some()
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// All records, or those matching `filter`. Never fails; an empty
    /// match is an empty result.
    pub async fn list(&self, filter: Option<&FilterSet>) -> ListResult<T> {
        self.inner.config.latency.delay().await;
        let snapshot = self.inner.collection.snapshot();
        let data: Vec<Arc<T>> = match filter {
            Some(filter) => snapshot
                .items
                .iter()
                .filter(|r| filter.matches(r.as_ref()))
                .cloned()
                .collect(),
            None => snapshot.items.to_vec(),
        };
        ListResult {
            total: data.len(),
            data,
            version: snapshot.version,
        }
    }

    /// [`list`](Self::list), abandoned with [`CoreError::Cancelled`] as
    /// soon as `token` fires.
    pub async fn list_cancellable(
        &self,
        filter: Option<&FilterSet>,
        token: &CancellationToken,
    ) -> Result<ListResult<T>, CoreError> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(entity = T::KIND, "list cancelled");
                Err(CoreError::Cancelled)
            }
            result = self.list(filter) => Ok(result),
        }
    }

    /// [`list`](Self::list) under a sequencer ticket. Returns `None` when a
    /// newer request was issued on `sequencer` while this one was in
    /// flight, so a late response can never overwrite a fresher one.
    pub async fn list_latest(
        &self,
        sequencer: &RequestSequencer,
        filter: Option<&FilterSet>,
    ) -> Option<ListResult<T>> {
        let ticket = sequencer.issue();
        let result = self.list(filter).await;
        if sequencer.is_current(ticket) {
            Some(result)
        } else {
            debug!(
                entity = T::KIND,
                ticket = ticket.seq(),
                "discarding superseded list response"
            );
            None
        }
    }

    /// `None` when absent. Never fails.
    pub async fn get_by_id(&self, id: &EntityId) -> Option<Arc<T>> {
        self.inner.config.latency.delay().await;
        self.inner.collection.get(id)
    }

    /// The record plus its current revision, for use with
    /// [`update_if_revision`](Self::update_if_revision).
    pub async fn get_with_revision(&self, id: &EntityId) -> Option<(Arc<T>, u64)> {
        self.inner.config.latency.delay().await;
        self.inner.collection.get_with_revision(id)
    }

    /// Current snapshot, without simulated latency.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.inner.collection.snapshot()
    }

    pub fn version(&self) -> u64 {
        self.inner.collection.version()
    }

    pub fn len(&self) -> usize {
        self.inner.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observe every future change to the collection.
    pub fn subscribe(&self) -> EntityStream<T> {
        EntityStream::new(self.inner.collection.subscribe())
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Validate `draft`, assign a fresh id and the initial status.
    pub async fn create(&self, draft: T::Draft) -> Result<Arc<T>, CoreError> {
        self.write_stored(Mutation::Create(draft)).await
    }

    /// Merge `patch` into the record. `NotFound` when absent.
    pub async fn update(&self, id: &EntityId, patch: T::Patch) -> Result<Arc<T>, CoreError> {
        self.modify(id, None, "update", move |record: &mut T, _now| {
            record.apply_patch(patch)
        })
        .await
    }

    /// [`update`](Self::update) that only applies if the record is still
    /// at `expected_revision`; `ConcurrencyConflict` otherwise.
    pub async fn update_if_revision(
        &self,
        id: &EntityId,
        expected_revision: u64,
        patch: T::Patch,
    ) -> Result<Arc<T>, CoreError> {
        self.modify(
            id,
            Some(expected_revision),
            "update",
            move |record: &mut T, _now| record.apply_patch(patch),
        )
        .await
    }

    /// `true` if a record was removed, `false` if `id` was absent.
    pub async fn remove(&self, id: &EntityId) -> Result<bool, CoreError> {
        match self.write(Mutation::Remove(id.clone())).await? {
            Applied::Removed(removed) => Ok(removed),
            other => Err(unexpected(&other)),
        }
    }

    // ── Write plumbing ───────────────────────────────────────────────

    async fn modify<F>(
        &self,
        id: &EntityId,
        expected_revision: Option<u64>,
        op: &'static str,
        edit: F,
    ) -> Result<Arc<T>, CoreError>
    where
        F: FnOnce(&mut T, chrono::DateTime<chrono::Utc>) -> Result<(), CoreError> + Send + 'static,
    {
        self.write_stored(Mutation::Modify {
            id: id.clone(),
            expected_revision,
            op,
            edit: Box::new(edit),
        })
        .await
    }

    async fn write_stored(&self, mutation: Mutation<T>) -> Result<Arc<T>, CoreError> {
        match self.write(mutation).await? {
            Applied::Stored(record) => Ok(record),
            other => Err(unexpected(&other)),
        }
    }

    /// Queue a mutation and wait for its result, then pay the simulated
    /// round trip. Latency is added after the write lands so that writes
    /// keep their issue order.
    async fn write(&self, mutation: Mutation<T>) -> Result<Applied<T>, CoreError> {
        let write_tx = self
            .inner
            .runtime
            .lock()
            .await
            .as_ref()
            .map(|runtime| runtime.write_tx.clone())
            .ok_or_else(stopped::<T>)?;

        let (response_tx, response_rx) = oneshot::channel();
        write_tx
            .send(WriteEnvelope {
                mutation,
                response_tx,
            })
            .await
            .map_err(|_| stopped::<T>())?;

        let result = response_rx.await.map_err(|_| stopped::<T>())?;
        self.inner.config.latency.delay().await;
        result
    }
}

impl<T: Lifecycle> DataService<T> {
    /// Apply a lifecycle action.
    ///
    /// `InvalidTransition` when the action is illegal from the record's
    /// current status; the record is left unchanged.
    pub async fn transition(
        &self,
        id: &EntityId,
        action: T::Action,
        payload: TransitionPayload,
    ) -> Result<Arc<T>, CoreError> {
        let result = self
            .modify(id, None, "transition", move |record: &mut T, now| {
                apply_transition(record, action, &payload, now)
            })
            .await;
        if let Err(ref e @ CoreError::InvalidTransition { .. }) = result {
            warn!(entity = T::KIND, %id, %action, error = %e, "transition rejected");
        }
        result
    }

    /// [`transition`](Self::transition) with the action given by name
    /// (`"admit"`, `"mark_read"`). `UnknownAction` if it names none.
    pub async fn transition_named(
        &self,
        id: &EntityId,
        action: &str,
        payload: TransitionPayload,
    ) -> Result<Arc<T>, CoreError> {
        let action = T::parse_action(action)?;
        self.transition(id, action, payload).await
    }
}

fn stopped<T: Record>() -> CoreError {
    CoreError::ServiceStopped {
        entity_type: T::KIND.into(),
    }
}

fn unexpected<T>(applied: &Applied<T>) -> CoreError {
    let kind = match applied {
        Applied::Stored(_) => "stored record",
        Applied::Removed(_) => "removal flag",
        Applied::Replaced(_) => "replacement count",
    };
    CoreError::Internal(format!("write processor returned unexpected {kind}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
