// ── Domain model ──
//
// Every record type stored by a DataService, their status machines,
// and the generic `Record` / `Lifecycle` traits the core operates on.

pub mod audit;
pub mod bid;
pub mod claim;
pub mod dataset;
pub mod entity_id;
pub mod field;
pub mod notification;
pub mod record;
pub mod subscription;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use casebook_core::model::*` gives you everything.

// Identity and generic shapes
pub use entity_id::EntityId;
pub use field::FieldValue;
pub use record::{Lifecycle, Record, TransitionPayload, apply_transition};

// Entities
pub use audit::{AuditDraft, AuditLogEntry, AuditPatch, Severity};
pub use bid::{Bid, BidAction, BidDraft, BidPatch, BidStatus};
pub use claim::{Claim, ClaimAction, ClaimDraft, ClaimPatch, ClaimStatus};
pub use notification::{
    Notification, NotificationAction, NotificationDraft, NotificationPatch, NotificationStatus,
    Priority,
};
pub use subscription::{
    Plan, Subscription, SubscriptionAction, SubscriptionDraft, SubscriptionPatch,
    SubscriptionStatus,
};

// Seed documents
pub use dataset::Dataset;
