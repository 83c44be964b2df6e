// ── Dataset document ──
//
// The serde shape of every collection at once. Used to seed a
// `Workspace`, to import/export from the CLI, and for the built-in demo.

use serde::{Deserialize, Serialize};

use super::{AuditLogEntry, Bid, Claim, Notification, Subscription};
use crate::error::CoreError;

const DEMO_JSON: &str = include_str!("../../fixtures/demo.json");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(default)]
    pub bids: Vec<Bid>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub audit_log: Vec<AuditLogEntry>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl Dataset {
    /// The demo case file shipped with the crate.
    pub fn demo() -> Result<Self, CoreError> {
        Self::from_json(DEMO_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Internal(format!("Serialization error: {e}")))
    }

    pub fn len(&self) -> usize {
        self.claims.len()
            + self.bids.len()
            + self.notifications.len()
            + self.audit_log.len()
            + self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
