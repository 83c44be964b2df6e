// ── Asset-sale bid ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;
use super::field::FieldValue;
use super::record::{Lifecycle, Record, TransitionPayload, opt_text, require_positive, require_text};
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
pub enum BidStatus {
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
    Withdrawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BidAction {
    Review,
    Accept,
    Reject,
    Renegotiate,
    Withdraw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: EntityId,
    pub bidder: String,
    pub asset: String,
    pub amount: i64,
    /// Invited bidders are pinned to the top of bid lists.
    #[serde(default)]
    pub invited: bool,
    pub status: BidStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidDraft {
    pub bidder: String,
    pub asset: String,
    pub amount: i64,
    #[serde(default)]
    pub invited: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BidPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Record for Bid {
    const KIND: &'static str = "bid";
    type Draft = BidDraft;
    type Patch = BidPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "bidder" => Some(self.bidder.as_str().into()),
            "asset" => Some(self.asset.as_str().into()),
            "amount" => Some(self.amount.into()),
            "invited" => Some(self.invited.into()),
            "status" => Some(self.status.to_string().into()),
            "note" => opt_text(self.note.as_ref()),
            "submitted_at" => Some(self.submitted_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }

    fn from_draft(id: EntityId, draft: BidDraft, now: DateTime<Utc>) -> Result<Self, CoreError> {
        require_text("bidder", &draft.bidder)?;
        require_text("asset", &draft.asset)?;
        require_positive("amount", draft.amount)?;
        Ok(Self {
            id,
            bidder: draft.bidder,
            asset: draft.asset,
            amount: draft.amount,
            invited: draft.invited,
            status: BidStatus::Submitted,
            note: None,
            submitted_at: now,
            updated_at: now,
        })
    }

    fn apply_patch(&mut self, patch: BidPatch) -> Result<(), CoreError> {
        if let Some(amount) = patch.amount {
            require_positive("amount", amount)?;
            if !matches!(self.status, BidStatus::Submitted | BidStatus::UnderReview) {
                return Err(CoreError::validation(
                    "amount",
                    format!("cannot revise a {} bid", self.status),
                ));
            }
            self.amount = amount;
        }
        if let Some(invited) = patch.invited {
            self.invited = invited;
        }
        if let Some(note) = patch.note {
            self.note = Some(note);
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Lifecycle for Bid {
    type Status = BidStatus;
    type Action = BidAction;

    fn status(&self) -> BidStatus {
        self.status
    }

    fn next_status(from: BidStatus, action: BidAction) -> Option<BidStatus> {
        use BidAction as A;
        use BidStatus as S;
        match (from, action) {
            (S::Submitted, A::Review) | (S::Rejected, A::Renegotiate) => Some(S::UnderReview),
            (S::UnderReview, A::Accept) => Some(S::Accepted),
            (S::UnderReview, A::Reject) => Some(S::Rejected),
            (S::Submitted | S::UnderReview, A::Withdraw) => Some(S::Withdrawn),
            _ => None,
        }
    }

    fn validate_payload(
        &self,
        action: BidAction,
        payload: &TransitionPayload,
    ) -> Result<(), CoreError> {
        match (action, payload.amount) {
            (BidAction::Renegotiate, Some(amount)) => require_positive("amount", amount),
            _ => Ok(()),
        }
    }

    fn enter(
        &mut self,
        to: BidStatus,
        action: BidAction,
        payload: &TransitionPayload,
        _now: DateTime<Utc>,
    ) {
        if payload.note.is_some() {
            self.note.clone_from(&payload.note);
        }
        if action == BidAction::Renegotiate {
            if let Some(amount) = payload.amount {
                self.amount = amount;
            }
        }
        self.status = to;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::record::apply_transition;

    fn bid(status: BidStatus) -> Bid {
        let mut b = Bid::from_draft(
            EntityId::from("bid-1"),
            BidDraft {
                bidder: "Harbor Capital".into(),
                asset: "Warehouse lot 4".into(),
                amount: 1_250_000,
                invited: false,
            },
            Utc::now(),
        )
        .unwrap();
        b.status = status;
        b
    }

    #[test]
    fn renegotiate_reopens_rejected_bid_with_new_amount() {
        let mut b = bid(BidStatus::Rejected);
        let p = TransitionPayload::default().with_amount(1_400_000);
        apply_transition(&mut b, BidAction::Renegotiate, &p, Utc::now()).unwrap();
        assert_eq!(b.status, BidStatus::UnderReview);
        assert_eq!(b.amount, 1_400_000);
    }

    #[test]
    fn accepted_bids_are_final() {
        for action in [BidAction::Renegotiate, BidAction::Withdraw, BidAction::Reject] {
            assert!(Bid::next_status(BidStatus::Accepted, action).is_none());
        }
    }

    #[test]
    fn withdrawn_bid_cannot_be_revised() {
        let mut b = bid(BidStatus::Withdrawn);
        let patch = BidPatch {
            amount: Some(10),
            ..BidPatch::default()
        };
        assert!(b.apply_patch(patch).is_err());
        assert_eq!(b.amount, 1_250_000);
    }
}
