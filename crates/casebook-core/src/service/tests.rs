use std::time::Duration;

use futures_util::future::join_all;
use pretty_assertions::assert_eq;
use tokio::time::Instant;

use super::*;
use crate::config::LatencyProfile;
use crate::model::{
    AuditDraft, AuditLogEntry, Bid, BidAction, BidStatus, Claim, ClaimAction, ClaimDraft,
    ClaimPatch, ClaimStatus, Dataset, Notification, NotificationPatch, Severity,
};
use crate::query::{FilterValue, ListQuery, Preset, QueryState, SortOrder};

async fn claims() -> DataService<Claim> {
    let svc = DataService::new(ServiceConfig::instant());
    svc.init(Dataset::demo().unwrap().claims).await.unwrap();
    svc
}

async fn notifications() -> DataService<Notification> {
    let svc = DataService::new(ServiceConfig::instant());
    svc.init(Dataset::demo().unwrap().notifications)
        .await
        .unwrap();
    svc
}

fn with_latency(ms: u64) -> ServiceConfig {
    ServiceConfig {
        latency: LatencyProfile::constant(Duration::from_millis(ms)),
        ..ServiceConfig::default()
    }
}

fn ids<T: Record>(items: &[Arc<T>]) -> Vec<String> {
    items.iter().map(|r| r.id().to_string()).collect()
}

// ── CRUD ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_fresh_id_and_initial_status() {
    let svc = claims().await;
    let before = svc.len();
    let claim = svc
        .create(ClaimDraft {
            claimant: "Atlas Freight GmbH".into(),
            category: "unsecured".into(),
            claimed_amount: 48_000,
        })
        .await
        .unwrap();

    assert!(claim.id.as_uuid().is_some());
    assert_eq!(claim.status, ClaimStatus::Open);
    assert_eq!(claim.created_at, claim.updated_at);
    assert_eq!(svc.len(), before + 1);
    assert_eq!(svc.get_by_id(&claim.id).await.unwrap().claimant, "Atlas Freight GmbH");
}

#[tokio::test]
async fn invalid_draft_is_rejected_without_insert() {
    let svc = claims().await;
    let before = svc.version();
    let err = svc
        .create(ClaimDraft {
            claimant: String::new(),
            category: "secured".into(),
            claimed_amount: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "claimant"));
    assert_eq!(svc.version(), before);
}

#[tokio::test]
async fn update_merges_patch_and_bumps_updated_at() {
    let svc = claims().await;
    let id = EntityId::from("clm-001");
    let original = svc.get_by_id(&id).await.unwrap();

    let updated = svc
        .update(
            &id,
            ClaimPatch {
                assignee: Some("m.weber".into()),
                ..ClaimPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.assignee.as_deref(), Some("m.weber"));
    assert_eq!(updated.claimant, original.claimant);
    assert!(updated.updated_at > original.updated_at);
}

#[tokio::test]
async fn update_of_missing_id_is_not_found_and_changes_nothing() {
    let svc = claims().await;
    let before = svc.snapshot();
    let err = svc
        .update(&EntityId::from("nonexistent-id"), ClaimPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { ref identifier, .. } if identifier == "nonexistent-id"));

    let after = svc.snapshot();
    assert_eq!(after.version, before.version);
    assert_eq!(ids(&after.items), ids(&before.items));
}

#[tokio::test]
async fn remove_reports_whether_anything_was_removed() {
    let svc = claims().await;
    let len = svc.len();
    assert!(!svc.remove(&EntityId::from("nonexistent-id")).await.unwrap());
    assert_eq!(svc.len(), len);

    assert!(svc.remove(&EntityId::from("clm-003")).await.unwrap());
    assert_eq!(svc.len(), len - 1);
    assert!(svc.get_by_id(&EntityId::from("clm-003")).await.is_none());
}

#[tokio::test]
async fn list_applies_field_filters() {
    let svc = notifications().await;
    let all = svc.list(None).await;
    assert_eq!(all.total, 6);

    let unread = FilterSet::new().with("status", "unread");
    let result = svc.list(Some(&unread)).await;
    assert_eq!(result.total, 3);
    assert!(result.data.iter().all(|n| n.status.to_string() == "unread"));

    let nothing = FilterSet::new().with("status", "deleted");
    assert!(svc.list(Some(&nothing)).await.data.is_empty());
}

#[tokio::test]
async fn query_state_uses_configured_page_size() {
    let svc: DataService<Claim> = DataService::new(ServiceConfig {
        default_page_size: 3,
        ..ServiceConfig::instant()
    });
    svc.init(Dataset::demo().unwrap().claims).await.unwrap();

    let state = svc.query_state();
    assert_eq!(state.page_size, 3);
    let view = Claim::list_query().derive(&svc.list(None).await.data, &state);
    assert_eq!(view.items.len(), 3);
    assert_eq!(view.total_pages, 3);
}

// ── Transitions ─────────────────────────────────────────────────────

#[tokio::test]
async fn illegal_transition_is_rejected_and_status_kept() {
    let svc = claims().await;
    let id = EntityId::from("clm-001");
    let err = svc
        .transition(&id, ClaimAction::Admit, TransitionPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidTransition { ref from, ref action, .. } if from == "open" && action == "admit"
    ));
    assert_eq!(svc.get_by_id(&id).await.unwrap().status, ClaimStatus::Open);
}

#[tokio::test]
async fn claim_walks_its_lifecycle() {
    let svc = claims().await;
    let id = EntityId::from("clm-008");
    for action in ["submit", "allocate", "verify", "admit"] {
        svc.transition_named(&id, action, TransitionPayload::by("a.trustee"))
            .await
            .unwrap();
    }
    let claim = svc.get_by_id(&id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Accepted);
    assert_eq!(claim.assignee.as_deref(), Some("a.trustee"));
    assert_eq!(claim.admitted_amount, Some(claim.claimed_amount));
}

#[tokio::test]
async fn unknown_action_name_is_reported() {
    let svc = claims().await;
    let err = svc
        .transition_named(&EntityId::from("clm-001"), "approve", TransitionPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownAction { ref action, .. } if action == "approve"));
}

#[tokio::test]
async fn admitted_amount_outside_claim_is_rejected() {
    let svc = claims().await;
    let id = EntityId::from("clm-005");
    for amount in [-1_000, 0, 3_100_001] {
        let err = svc
            .transition(&id, ClaimAction::Admit, TransitionPayload::default().with_amount(amount))
            .await
            .unwrap_err();
        assert!(
            matches!(err, CoreError::Validation { ref field, .. } if field == "admitted_amount"),
            "amount {amount}: {err:?}"
        );
    }
    let claim = svc.get_by_id(&id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::AdmissionPending);
    assert_eq!(claim.admitted_amount, None);

    let claim = svc
        .transition(&id, ClaimAction::Admit, TransitionPayload::default().with_amount(3_100_000))
        .await
        .unwrap();
    assert_eq!(claim.admitted_amount, Some(3_100_000));
}

#[tokio::test]
async fn renegotiated_amount_must_be_positive() {
    let svc: DataService<Bid> = DataService::new(ServiceConfig::instant());
    svc.init(Dataset::demo().unwrap().bids).await.unwrap();
    let id = EntityId::from("bid-003");

    let err = svc
        .transition(&id, BidAction::Renegotiate, TransitionPayload::default().with_amount(-5))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "amount"));

    let bid = svc.get_by_id(&id).await.unwrap();
    assert_eq!(bid.status, BidStatus::Rejected);
    assert_eq!(bid.amount, 680_000);
}

// ── Concurrency ─────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_writes_apply_in_issue_order() {
    let svc = DataService::<AuditLogEntry>::new(ServiceConfig::instant());
    svc.init(Vec::new()).await.unwrap();

    let writes = (0..20).map(|i| {
        svc.create(AuditDraft {
            actor: format!("actor-{i:02}"),
            action: "login".into(),
            resource: "session".into(),
            severity: Severity::Info,
            details: None,
        })
    });
    for result in join_all(writes).await {
        result.unwrap();
    }

    let actors: Vec<String> = svc
        .snapshot()
        .items
        .iter()
        .map(|e| e.actor.clone())
        .collect();
    let expected: Vec<String> = (0..20).map(|i| format!("actor-{i:02}")).collect();
    assert_eq!(actors, expected);
}

#[tokio::test]
async fn last_queued_update_wins() {
    let svc = notifications().await;
    let id = EntityId::from("ntf-001");
    let writes = (1..=10).map(|i| {
        svc.update(
            &id,
            NotificationPatch {
                title: Some(format!("title {i}")),
                ..NotificationPatch::default()
            },
        )
    });
    join_all(writes).await;

    let (record, revision) = svc.get_with_revision(&id).await.unwrap();
    assert_eq!(record.title, "title 10");
    assert_eq!(revision, 11);
}

#[tokio::test]
async fn stale_revision_is_a_conflict() {
    let svc = claims().await;
    let id = EntityId::from("clm-002");
    let (_, revision) = svc.get_with_revision(&id).await.unwrap();
    let patch = || ClaimPatch {
        category: Some("preferential".into()),
        ..ClaimPatch::default()
    };

    svc.update_if_revision(&id, revision, patch()).await.unwrap();
    let err = svc
        .update_if_revision(&id, revision, patch())
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        CoreError::ConcurrencyConflict { expected, actual, .. } if expected == revision && actual == revision + 1
    ));
}

#[tokio::test(start_paused = true)]
async fn reads_and_writes_pay_the_latency_band() {
    let svc = DataService::<Claim>::new(with_latency(300));
    svc.init(Dataset::demo().unwrap().claims).await.unwrap();

    let start = Instant::now();
    svc.get_by_id(&EntityId::from("clm-001")).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(300));

    let start = Instant::now();
    svc.remove(&EntityId::from("clm-001")).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn cancelled_list_resolves_with_cancelled() {
    let svc = DataService::<Claim>::new(with_latency(1_000));
    svc.init(Dataset::demo().unwrap().claims).await.unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });
    let result = svc.list_cancellable(None, &token).await;
    assert!(matches!(result, Err(CoreError::Cancelled)));

    let fresh = CancellationToken::new();
    assert_eq!(svc.list_cancellable(None, &fresh).await.unwrap().total, 8);
}

#[tokio::test(start_paused = true)]
async fn superseded_list_response_is_discarded() {
    let svc = DataService::<Claim>::new(with_latency(500));
    svc.init(Dataset::demo().unwrap().claims).await.unwrap();
    let sequencer = RequestSequencer::new();

    let open = FilterSet::new().with("status", "open");
    let (stale, fresh) = tokio::join!(
        svc.list_latest(&sequencer, None),
        svc.list_latest(&sequencer, Some(&open)),
    );
    assert!(stale.is_none());
    assert_eq!(fresh.unwrap().total, 2);
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn writes_need_a_running_service() {
    let svc = DataService::<Claim>::new(ServiceConfig::instant());
    let err = svc.remove(&EntityId::from("clm-001")).await.unwrap_err();
    assert!(matches!(err, CoreError::ServiceStopped { ref entity_type } if entity_type == "claim"));
    assert!(!svc.is_running().await);

    svc.init(Dataset::demo().unwrap().claims).await.unwrap();
    assert!(svc.is_running().await);
    svc.shutdown().await;
    svc.shutdown().await;

    assert!(matches!(
        svc.remove(&EntityId::from("clm-001")).await,
        Err(CoreError::ServiceStopped { .. })
    ));
    // Reads keep serving the last state.
    assert_eq!(svc.list(None).await.total, 8);
}

#[tokio::test]
async fn reset_replaces_everything_and_rejects_duplicate_ids() {
    let svc = claims().await;
    svc.create(ClaimDraft {
        claimant: "Extra".into(),
        category: "unsecured".into(),
        claimed_amount: 10,
    })
    .await
    .unwrap();

    let seed = Dataset::demo().unwrap().claims;
    svc.reset(seed.clone()).await.unwrap();
    assert_eq!(svc.len(), 8);

    let mut dup = seed.clone();
    dup.push(seed[0].clone());
    assert!(matches!(
        svc.reset(dup.clone()).await,
        Err(CoreError::Validation { .. })
    ));
    assert_eq!(svc.len(), 8);

    let fresh = DataService::<Claim>::new(ServiceConfig::instant());
    assert!(fresh.init(dup).await.is_err());
    assert!(!fresh.is_running().await);
}

#[tokio::test]
async fn separate_instances_do_not_share_state() {
    let a = claims().await;
    let b = claims().await;
    a.remove(&EntityId::from("clm-001")).await.unwrap();
    assert_eq!(a.len(), 7);
    assert_eq!(b.len(), 8);
}

#[tokio::test]
async fn subscribers_see_writes() {
    let svc = notifications().await;
    let mut stream = svc.subscribe();
    let before = stream.current().version;

    svc.transition_named(
        &EntityId::from("ntf-001"),
        "mark_read",
        TransitionPayload::default(),
    )
    .await
    .unwrap();

    let snap = stream.changed().await.unwrap();
    assert!(snap.version > before);
    let read = snap
        .items
        .iter()
        .find(|n| n.id == EntityId::from("ntf-001"))
        .unwrap();
    assert!(read.read_at.is_some());
}

// ── Service + pipeline ──────────────────────────────────────────────

#[tokio::test]
async fn listed_claims_feed_the_pipeline() {
    let svc = DataService::<Claim>::new(ServiceConfig::instant());
    let mut seed = Dataset::demo().unwrap().claims;
    seed.truncate(4);
    svc.init(seed).await.unwrap();

    let listed = svc.list(None).await;
    let mut state = QueryState::default();
    state.set_filter(
        "status",
        FilterValue::AnyOf(vec!["verification_pending".into()]),
    );
    state.set_sort("claimed_amount", SortOrder::Desc);

    let query: ListQuery<Claim> = Claim::list_query();
    let view = query.derive(&listed.data, &state);
    let amounts: Vec<i64> = view.items.iter().map(|c| c.claimed_amount).collect();
    assert_eq!(amounts, vec![2_500_000, 1_200_000]);
    assert_eq!((view.total_matches, view.total_pages), (2, 1));
}
