// ── Record and lifecycle traits ──
//
// `Record` is the generic shape every collection stores. `Lifecycle`
// adds a closed status enum plus a legal-transition table, enforced by
// the DataService rather than by whoever calls it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::entity_id::EntityId;
use super::field::FieldValue;
use crate::error::CoreError;

/// One entity instance held by a collection.
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    /// Entity-type name used in errors and logs (e.g. `"claim"`).
    const KIND: &'static str;

    /// The record without its id and lifecycle fields.
    type Draft: Send + 'static;

    /// A partial record merged by `update`.
    type Patch: Send + 'static;

    fn id(&self) -> &EntityId;

    /// Read a field by its snake_case name.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Build a new record: validates the draft, assigns the initial status
    /// and creation timestamps.
    fn from_draft(id: EntityId, draft: Self::Draft, now: DateTime<Utc>) -> Result<Self, CoreError>;

    /// Merge a patch. Must validate before touching any field.
    fn apply_patch(&mut self, patch: Self::Patch) -> Result<(), CoreError>;

    /// Stamp the last-modified time.
    fn touch(&mut self, now: DateTime<Utc>);
}

/// A record with a finite status machine.
pub trait Lifecycle: Record {
    type Status: Copy + Eq + fmt::Display + fmt::Debug + Send + Sync + 'static;
    type Action: Copy
        + Eq
        + fmt::Display
        + fmt::Debug
        + FromStr
        + IntoEnumIterator
        + Send
        + Sync
        + 'static;

    fn status(&self) -> Self::Status;

    /// The transition table: `None` when `action` is illegal from `from`.
    fn next_status(from: Self::Status, action: Self::Action) -> Option<Self::Status>;

    /// Check the payload an action carries before anything is written.
    fn validate_payload(
        &self,
        _action: Self::Action,
        _payload: &TransitionPayload,
    ) -> Result<(), CoreError> {
        Ok(())
    }

    /// Move to `to` and update the action's side fields.
    fn enter(
        &mut self,
        to: Self::Status,
        action: Self::Action,
        payload: &TransitionPayload,
        now: DateTime<Utc>,
    );

    /// Every action legal from `from`, in declaration order.
    fn allowed_actions(from: Self::Status) -> Vec<Self::Action> {
        Self::Action::iter()
            .filter(|a| Self::next_status(from, *a).is_some())
            .collect()
    }

    /// Parse an action by its snake_case name.
    fn parse_action(name: &str) -> Result<Self::Action, CoreError> {
        name.parse().map_err(|_| CoreError::UnknownAction {
            entity_type: Self::KIND.into(),
            action: name.into(),
        })
    }
}

/// Optional data carried by a transition (who, why, how much).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

impl TransitionPayload {
    pub fn by(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
            ..Self::default()
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Apply `action` to `record` if the table allows it.
///
/// On rejection (illegal action or bad payload) the record is left untouched.
pub fn apply_transition<T: Lifecycle>(
    record: &mut T,
    action: T::Action,
    payload: &TransitionPayload,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    let from = record.status();
    let Some(to) = T::next_status(from, action) else {
        return Err(CoreError::InvalidTransition {
            entity_type: T::KIND.into(),
            identifier: record.id().to_string(),
            from: from.to_string(),
            action: action.to_string(),
        });
    };
    record.validate_payload(action, payload)?;
    record.enter(to, action, payload, now);
    record.touch(now);
    Ok(())
}

// ── Validation helpers ───────────────────────────────────────────────

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: i64) -> Result<(), CoreError> {
    if value <= 0 {
        return Err(CoreError::validation(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn opt_text(value: Option<&String>) -> Option<FieldValue> {
    value.map(|s| FieldValue::Text(s.clone()))
}
