// ── Audit log entry ──
//
// Append-mostly: no status machine, only `details` can be amended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;
use super::field::FieldValue;
use super::record::{Record, opt_text, require_text};
use crate::error::CoreError;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: EntityId,
    pub actor: String,
    pub action: String,
    pub resource: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditDraft {
    pub actor: String,
    pub action: String,
    pub resource: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditPatch {
    pub details: Option<String>,
}

impl Record for AuditLogEntry {
    const KIND: &'static str = "audit_log_entry";
    type Draft = AuditDraft;
    type Patch = AuditPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "actor" => Some(self.actor.as_str().into()),
            "action" => Some(self.action.as_str().into()),
            "resource" => Some(self.resource.as_str().into()),
            "severity" => Some(self.severity.to_string().into()),
            "details" => opt_text(self.details.as_ref()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }

    fn from_draft(id: EntityId, draft: AuditDraft, now: DateTime<Utc>) -> Result<Self, CoreError> {
        require_text("actor", &draft.actor)?;
        require_text("action", &draft.action)?;
        Ok(Self {
            id,
            actor: draft.actor,
            action: draft.action,
            resource: draft.resource,
            severity: draft.severity,
            details: draft.details,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_patch(&mut self, patch: AuditPatch) -> Result<(), CoreError> {
        self.details = patch.details;
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
