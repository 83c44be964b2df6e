// ── Per-entity list definitions ──
//
// The searchable fields, sort columns, tabs and pinning each entity's
// list uses. Field names match `Record::field`.

use super::pipeline::{Comparator, ListQuery};
use crate::model::{
    AuditLogEntry, Bid, BidStatus, Claim, ClaimStatus, Notification, NotificationStatus, Record,
    Severity, Subscription, SubscriptionStatus,
};

/// A record type with a ready-made list definition.
pub trait Preset: Record {
    fn list_query() -> ListQuery<Self>;
}

impl Preset for Claim {
    fn list_query() -> ListQuery<Self> {
        ListQuery::new()
            .search(["id", "claimant", "category"])
            .sort_field("claimant", Comparator::Text)
            .sort_field("category", Comparator::Text)
            .sort_field("status", Comparator::Text)
            .sort_field("claimed_amount", Comparator::Numeric)
            .sort_field("admitted_amount", Comparator::Numeric)
            .sort_field("created_at", Comparator::Chronological)
            .sort_field("updated_at", Comparator::Chronological)
            .tab("open", |c: &Claim| c.status == ClaimStatus::Open)
            .tab("pending", |c: &Claim| c.status.is_pending())
            .tab("verification", |c: &Claim| {
                c.status == ClaimStatus::VerificationPending
            })
            .tab("closed", |c: &Claim| c.status.is_closed())
    }
}

impl Preset for Bid {
    fn list_query() -> ListQuery<Self> {
        ListQuery::new()
            .search(["id", "bidder", "asset"])
            .sort_field("bidder", Comparator::Text)
            .sort_field("asset", Comparator::Text)
            .sort_field("status", Comparator::Text)
            .sort_field("amount", Comparator::Numeric)
            .sort_field("submitted_at", Comparator::Chronological)
            .tab("active", |b: &Bid| {
                matches!(b.status, BidStatus::Submitted | BidStatus::UnderReview)
            })
            .tab("decided", |b: &Bid| {
                matches!(b.status, BidStatus::Accepted | BidStatus::Rejected)
            })
            .tab("withdrawn", |b: &Bid| b.status == BidStatus::Withdrawn)
            .pin(|b: &Bid| b.invited)
    }
}

impl Preset for Notification {
    fn list_query() -> ListQuery<Self> {
        ListQuery::new()
            .search(["title", "message"])
            .sort_field("title", Comparator::Text)
            .sort_field("status", Comparator::Text)
            .sort_field("priority_rank", Comparator::Numeric)
            .sort_field("created_at", Comparator::Chronological)
            .sort_field("read_at", Comparator::Chronological)
            .tab("inbox", |n: &Notification| {
                n.status != NotificationStatus::Archived
            })
            .tab("unread", |n: &Notification| {
                n.status == NotificationStatus::Unread
            })
            .tab("archived", |n: &Notification| {
                n.status == NotificationStatus::Archived
            })
    }
}

impl Preset for Subscription {
    fn list_query() -> ListQuery<Self> {
        ListQuery::new()
            .search(["id", "tenant", "plan"])
            .sort_field("tenant", Comparator::Text)
            .sort_field("plan", Comparator::Text)
            .sort_field("status", Comparator::Text)
            .sort_field("seats", Comparator::Numeric)
            .sort_field("created_at", Comparator::Chronological)
            .tab("active", |s: &Subscription| {
                s.status == SubscriptionStatus::Active
            })
            .tab("trial", |s: &Subscription| s.status == SubscriptionStatus::Trial)
            .tab("paused", |s: &Subscription| {
                s.status == SubscriptionStatus::Paused
            })
            .tab("ended", |s: &Subscription| {
                matches!(
                    s.status,
                    SubscriptionStatus::Cancelled | SubscriptionStatus::Expired
                )
            })
    }
}

impl Preset for AuditLogEntry {
    fn list_query() -> ListQuery<Self> {
        ListQuery::new()
            .search(["actor", "action", "resource", "details"])
            .sort_field("actor", Comparator::Text)
            .sort_field("action", Comparator::Text)
            .sort_field("severity", Comparator::Text)
            .sort_field("created_at", Comparator::Chronological)
            .tab("critical", |e: &AuditLogEntry| e.severity == Severity::Critical)
            .tab("alerts", |e: &AuditLogEntry| e.severity >= Severity::Warning)
    }
}
