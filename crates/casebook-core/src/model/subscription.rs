// ── Tenant subscription ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;
use super::field::FieldValue;
use super::record::{Lifecycle, Record, TransitionPayload, require_text};
use crate::error::CoreError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Paused,
    Cancelled,
    Expired,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Plan {
    Basic,
    Professional,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionAction {
    Activate,
    Pause,
    Resume,
    Cancel,
    Expire,
    Renew,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: EntityId,
    pub tenant: String,
    pub plan: Plan,
    pub seats: u32,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionDraft {
    pub tenant: String,
    pub plan: Plan,
    pub seats: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
}

fn require_seats(seats: u32) -> Result<(), CoreError> {
    if seats == 0 {
        return Err(CoreError::validation("seats", "at least one seat is required"));
    }
    Ok(())
}

impl Record for Subscription {
    const KIND: &'static str = "subscription";
    type Draft = SubscriptionDraft;
    type Patch = SubscriptionPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "tenant" => Some(self.tenant.as_str().into()),
            "plan" => Some(self.plan.to_string().into()),
            "seats" => Some(self.seats.into()),
            "status" => Some(self.status.to_string().into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            "cancelled_at" => self.cancelled_at.map(FieldValue::from),
            _ => None,
        }
    }

    fn from_draft(
        id: EntityId,
        draft: SubscriptionDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        require_text("tenant", &draft.tenant)?;
        require_seats(draft.seats)?;
        Ok(Self {
            id,
            tenant: draft.tenant,
            plan: draft.plan,
            seats: draft.seats,
            status: SubscriptionStatus::Trial,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        })
    }

    fn apply_patch(&mut self, patch: SubscriptionPatch) -> Result<(), CoreError> {
        if let Some(seats) = patch.seats {
            require_seats(seats)?;
        }
        if matches!(
            self.status,
            SubscriptionStatus::Cancelled | SubscriptionStatus::Expired
        ) && (patch.plan.is_some() || patch.seats.is_some())
        {
            return Err(CoreError::validation(
                "plan",
                format!("cannot change a {} subscription", self.status),
            ));
        }
        if let Some(plan) = patch.plan {
            self.plan = plan;
        }
        if let Some(seats) = patch.seats {
            self.seats = seats;
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Lifecycle for Subscription {
    type Status = SubscriptionStatus;
    type Action = SubscriptionAction;

    fn status(&self) -> SubscriptionStatus {
        self.status
    }

    fn next_status(
        from: SubscriptionStatus,
        action: SubscriptionAction,
    ) -> Option<SubscriptionStatus> {
        use SubscriptionAction as A;
        use SubscriptionStatus as S;
        match (from, action) {
            (S::Trial, A::Activate) | (S::Paused, A::Resume) | (S::Expired, A::Renew) => {
                Some(S::Active)
            }
            (S::Active, A::Pause) => Some(S::Paused),
            (S::Trial | S::Active | S::Paused, A::Cancel) => Some(S::Cancelled),
            (S::Trial | S::Active, A::Expire) => Some(S::Expired),
            _ => None,
        }
    }

    fn enter(
        &mut self,
        to: SubscriptionStatus,
        action: SubscriptionAction,
        _payload: &TransitionPayload,
        now: DateTime<Utc>,
    ) {
        if action == SubscriptionAction::Cancel {
            self.cancelled_at = Some(now);
        }
        self.status = to;
    }
}
