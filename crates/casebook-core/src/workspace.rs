// ── Workspace facade ──
//
// One DataService per entity type, started and stopped together.
// Each service owns an independent collection; nothing is shared.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::CoreError;
use crate::model::{AuditLogEntry, Bid, Claim, Dataset, Notification, Record, Subscription};
use crate::query::count_by_field;
use crate::service::{DataService, ensure_unique_ids};

/// Badge counts for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub entity: &'static str,
    pub total: usize,
    /// Counts per value of `grouped_by`, over the full collection.
    pub counts: BTreeMap<String, usize>,
    pub grouped_by: &'static str,
}

/// All of a tenant's record services.
///
/// Cheaply cloneable via `Arc`. Like a single [`DataService`], `new` only
/// builds; [`init`](Self::init) loads data and starts the write queues.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

struct WorkspaceInner {
    claims: DataService<Claim>,
    bids: DataService<Bid>,
    notifications: DataService<Notification>,
    audit_log: DataService<AuditLogEntry>,
    subscriptions: DataService<Subscription>,
}

impl Workspace {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            inner: Arc::new(WorkspaceInner {
                claims: DataService::new(config.clone()),
                bids: DataService::new(config.clone()),
                notifications: DataService::new(config.clone()),
                audit_log: DataService::new(config.clone()),
                subscriptions: DataService::new(config),
            }),
        }
    }

    // ── Service accessors ────────────────────────────────────────────

    pub fn claims(&self) -> &DataService<Claim> {
        &self.inner.claims
    }

    pub fn bids(&self) -> &DataService<Bid> {
        &self.inner.bids
    }

    pub fn notifications(&self) -> &DataService<Notification> {
        &self.inner.notifications
    }

    pub fn audit_log(&self) -> &DataService<AuditLogEntry> {
        &self.inner.audit_log
    }

    pub fn subscriptions(&self) -> &DataService<Subscription> {
        &self.inner.subscriptions
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load every collection from `dataset` and start all services.
    ///
    /// The whole dataset is checked before any service starts, so a bad
    /// seed leaves every service stopped.
    pub async fn init(&self, dataset: Dataset) -> Result<(), CoreError> {
        validate(&dataset)?;
        let total = dataset.len();
        let Dataset {
            claims,
            bids,
            notifications,
            audit_log,
            subscriptions,
        } = dataset;
        self.inner.claims.init(claims).await?;
        self.inner.bids.init(bids).await?;
        self.inner.notifications.init(notifications).await?;
        self.inner.audit_log.init(audit_log).await?;
        self.inner.subscriptions.init(subscriptions).await?;
        info!(records = total, "workspace initialised");
        Ok(())
    }

    /// Replace every collection. Each reset is ordered behind that
    /// service's pending writes.
    pub async fn reset(&self, dataset: Dataset) -> Result<(), CoreError> {
        validate(&dataset)?;
        let Dataset {
            claims,
            bids,
            notifications,
            audit_log,
            subscriptions,
        } = dataset;
        self.inner.claims.reset(claims).await?;
        self.inner.bids.reset(bids).await?;
        self.inner.notifications.reset(notifications).await?;
        self.inner.audit_log.reset(audit_log).await?;
        self.inner.subscriptions.reset(subscriptions).await?;
        Ok(())
    }

    /// The current contents of every collection.
    pub fn export(&self) -> Dataset {
        Dataset {
            claims: owned(&self.inner.claims),
            bids: owned(&self.inner.bids),
            notifications: owned(&self.inner.notifications),
            audit_log: owned(&self.inner.audit_log),
            subscriptions: owned(&self.inner.subscriptions),
        }
    }

    pub async fn shutdown(&self) {
        self.inner.claims.shutdown().await;
        self.inner.bids.shutdown().await;
        self.inner.notifications.shutdown().await;
        self.inner.audit_log.shutdown().await;
        self.inner.subscriptions.shutdown().await;
        info!("workspace shut down");
    }

    /// Init, run `f`, shut down. Shuts down even when `f` fails.
    pub async fn oneshot<F, Fut, R>(
        config: ServiceConfig,
        dataset: Dataset,
        f: F,
    ) -> Result<R, CoreError>
    where
        F: FnOnce(Workspace) -> Fut,
        Fut: Future<Output = Result<R, CoreError>>,
    {
        let workspace = Workspace::new(config);
        workspace.init(dataset).await?;
        let result = f(workspace.clone()).await;
        workspace.shutdown().await;
        result
    }

    // ── Aggregates ───────────────────────────────────────────────────

    /// Status counts for every lifecycle collection, severity counts for
    /// the audit log.
    pub fn stats(&self) -> Vec<CollectionStats> {
        vec![
            stats_for(&self.inner.claims, "status"),
            stats_for(&self.inner.bids, "status"),
            stats_for(&self.inner.notifications, "status"),
            stats_for(&self.inner.subscriptions, "status"),
            stats_for(&self.inner.audit_log, "severity"),
        ]
    }
}

fn validate(dataset: &Dataset) -> Result<(), CoreError> {
    ensure_unique_ids(&dataset.claims)?;
    ensure_unique_ids(&dataset.bids)?;
    ensure_unique_ids(&dataset.notifications)?;
    ensure_unique_ids(&dataset.audit_log)?;
    ensure_unique_ids(&dataset.subscriptions)
}

fn owned<T: Record>(service: &DataService<T>) -> Vec<T> {
    service
        .snapshot()
        .items
        .iter()
        .map(|record| T::clone(record))
        .collect()
}

fn stats_for<T: Record>(service: &DataService<T>, field: &'static str) -> CollectionStats {
    let snapshot = service.snapshot();
    CollectionStats {
        entity: T::KIND,
        total: snapshot.len(),
        counts: count_by_field(&snapshot.items, field),
        grouped_by: field,
    }
}
