// casebook-core: record services, lifecycle tables and the list-query
// pipeline behind every casebook list view.

pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod service;
pub mod store;
pub mod stream;
pub mod workspace;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{LatencyProfile, ServiceConfig};
pub use error::CoreError;
pub use query::{
    Comparator, DerivedView, FilterSet, FilterValue, ListQuery, Preset, QueryState, SortOrder,
    ViewCache, count_by_field, group_count,
};
pub use service::{DataService, ListResult, RequestSequencer, Ticket};
pub use store::Snapshot;
pub use stream::EntityStream;
pub use workspace::{CollectionStats, Workspace};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Identity and generic shapes
    EntityId, FieldValue, Lifecycle, Record, TransitionPayload,
    // Claims
    Claim, ClaimAction, ClaimDraft, ClaimPatch, ClaimStatus,
    // Bids
    Bid, BidAction, BidDraft, BidPatch, BidStatus,
    // Notifications
    Notification, NotificationAction, NotificationDraft, NotificationPatch, NotificationStatus,
    Priority,
    // Subscriptions
    Plan, Subscription, SubscriptionAction, SubscriptionDraft, SubscriptionPatch,
    SubscriptionStatus,
    // Audit log
    AuditDraft, AuditLogEntry, AuditPatch, Severity,
    // Seed documents
    Dataset,
};

// Token type taken by `DataService::list_cancellable`.
pub use tokio_util::sync::CancellationToken;
