// ── Core error types ──
//
// Every DataService operation resolves to `Result<_, CoreError>`.
// The list pipeline never produces one of these; it degrades instead.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Cannot {action} {entity_type} {identifier}: not allowed from status '{from}'")]
    InvalidTransition {
        entity_type: String,
        identifier: String,
        from: String,
        action: String,
    },

    #[error("Unknown {entity_type} action: {action}")]
    UnknownAction { entity_type: String, action: String },

    // ── Write errors ─────────────────────────────────────────────────
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(
        "Concurrent write to {entity_type} {identifier}: expected revision {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        entity_type: String,
        identifier: String,
        expected: u64,
        actual: u64,
    },

    // ── Request errors ───────────────────────────────────────────────
    #[error("Request cancelled")]
    Cancelled,

    #[error("{entity_type} service is not running")]
    ServiceStopped { entity_type: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrencyConflict { .. } | Self::Cancelled | Self::ServiceStopped { .. }
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("Deserialization error: {err}"))
    }
}
