// ── Creditor claim ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;
use super::field::FieldValue;
use super::record::{Lifecycle, Record, TransitionPayload, opt_text, require_positive, require_text};
use crate::error::CoreError;

/// Where a claim sits in the adjudication pipeline.
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
pub enum ClaimStatus {
    Open,
    AllocationPending,
    VerificationPending,
    AdmissionPending,
    Accepted,
    Rejected,
}

impl ClaimStatus {
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            Self::AllocationPending | Self::VerificationPending | Self::AdmissionPending
        )
    }

    pub fn is_closed(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ClaimAction {
    Submit,
    Allocate,
    Verify,
    Admit,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: EntityId,
    pub claimant: String,
    pub category: String,
    pub claimed_amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admitted_amount: Option<i64>,
    pub status: ClaimStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimDraft {
    pub claimant: String,
    pub category: String,
    pub claimed_amount: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl Record for Claim {
    const KIND: &'static str = "claim";
    type Draft = ClaimDraft;
    type Patch = ClaimPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "claimant" => Some(self.claimant.as_str().into()),
            "category" => Some(self.category.as_str().into()),
            "claimed_amount" => Some(self.claimed_amount.into()),
            "admitted_amount" => self.admitted_amount.map(FieldValue::from),
            "status" => Some(self.status.to_string().into()),
            "assignee" => opt_text(self.assignee.as_ref()),
            "rejection_reason" => opt_text(self.rejection_reason.as_ref()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }

    fn from_draft(id: EntityId, draft: ClaimDraft, now: DateTime<Utc>) -> Result<Self, CoreError> {
        require_text("claimant", &draft.claimant)?;
        require_text("category", &draft.category)?;
        require_positive("claimed_amount", draft.claimed_amount)?;
        Ok(Self {
            id,
            claimant: draft.claimant,
            category: draft.category,
            claimed_amount: draft.claimed_amount,
            admitted_amount: None,
            status: ClaimStatus::Open,
            assignee: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_patch(&mut self, patch: ClaimPatch) -> Result<(), CoreError> {
        if let Some(ref claimant) = patch.claimant {
            require_text("claimant", claimant)?;
        }
        if let Some(ref category) = patch.category {
            require_text("category", category)?;
        }
        if let Some(amount) = patch.claimed_amount {
            require_positive("claimed_amount", amount)?;
            if self.status.is_closed() {
                return Err(CoreError::validation(
                    "claimed_amount",
                    format!("cannot change the amount of a {} claim", self.status),
                ));
            }
        }

        if let Some(claimant) = patch.claimant {
            self.claimant = claimant;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(amount) = patch.claimed_amount {
            self.claimed_amount = amount;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = Some(assignee);
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Lifecycle for Claim {
    type Status = ClaimStatus;
    type Action = ClaimAction;

    fn status(&self) -> ClaimStatus {
        self.status
    }

    fn next_status(from: ClaimStatus, action: ClaimAction) -> Option<ClaimStatus> {
        use ClaimAction as A;
        use ClaimStatus as S;
        match (from, action) {
            (S::Open, A::Submit) => Some(S::AllocationPending),
            (S::AllocationPending, A::Allocate) => Some(S::VerificationPending),
            (S::VerificationPending, A::Verify) => Some(S::AdmissionPending),
            (S::AdmissionPending, A::Admit) => Some(S::Accepted),
            (S::VerificationPending | S::AdmissionPending, A::Reject) => Some(S::Rejected),
            _ => None,
        }
    }

    fn validate_payload(
        &self,
        action: ClaimAction,
        payload: &TransitionPayload,
    ) -> Result<(), CoreError> {
        match (action, payload.amount) {
            (ClaimAction::Admit, Some(amount)) if amount <= 0 || amount > self.claimed_amount => {
                Err(CoreError::validation(
                    "admitted_amount",
                    format!(
                        "must be between 1 and the claimed {}, got {amount}",
                        self.claimed_amount
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    fn enter(
        &mut self,
        to: ClaimStatus,
        action: ClaimAction,
        payload: &TransitionPayload,
        _now: DateTime<Utc>,
    ) {
        match action {
            ClaimAction::Allocate => {
                if let Some(ref actor) = payload.actor {
                    self.assignee = Some(actor.clone());
                }
            }
            ClaimAction::Admit => {
                self.admitted_amount = Some(payload.amount.unwrap_or(self.claimed_amount));
            }
            ClaimAction::Reject => {
                self.rejection_reason.clone_from(&payload.note);
            }
            ClaimAction::Submit | ClaimAction::Verify => {}
        }
        self.status = to;
    }
}
