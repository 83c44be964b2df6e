//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use casebook_config::ConfigError;
use casebook_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const UNAVAILABLE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(casebook::not_found),
        help("Run: casebook {list_command} to see available ids")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Cannot {action} {resource_type} '{identifier}' while it is {from}")]
    #[diagnostic(
        code(casebook::invalid_transition),
        help("Run: casebook {command} actions {identifier} to see what is allowed")
    )]
    InvalidTransition {
        resource_type: String,
        identifier: String,
        from: String,
        action: String,
        command: String,
    },

    #[error("'{action}' is not a {resource_type} action")]
    #[diagnostic(
        code(casebook::unknown_action),
        help("Run: casebook {command} actions <id> to list the actions of a record")
    )]
    UnknownAction {
        resource_type: String,
        action: String,
        command: String,
    },

    #[error("{resource_type} '{identifier}' changed since revision {expected} (now {actual})")]
    #[diagnostic(
        code(casebook::conflict),
        help("Fetch the record again and retry with --revision {actual}")
    )]
    Conflict {
        resource_type: String,
        identifier: String,
        expected: u64,
        actual: u64,
    },

    // ── Service ──────────────────────────────────────────────────────
    #[error("The {resource_type} service is not running")]
    #[diagnostic(code(casebook::unavailable))]
    Unavailable { resource_type: String },

    #[error("Request cancelled")]
    #[diagnostic(code(casebook::cancelled))]
    Cancelled,

    #[error("Internal error: {0}")]
    #[diagnostic(code(casebook::internal))]
    Internal(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(casebook::validation))]
    Validation { field: String, reason: String },

    // ── Data files ───────────────────────────────────────────────────
    #[error("--persist needs a dataset file to write to")]
    #[diagnostic(
        code(casebook::no_data_file),
        help("Pass --data <path> or set data.path in the config file.")
    )]
    NoDataFile,

    #[error("Could not load dataset {}", .path.display())]
    #[diagnostic(
        code(casebook::data_file),
        help("The file must be a JSON object with claims, bids, notifications, audit_log and subscriptions arrays.")
    )]
    DataFile {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {}", .path.display())]
    #[diagnostic(
        code(casebook::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: PathBuf },

    #[error(transparent)]
    #[diagnostic(
        code(casebook::config),
        help("Run: casebook config path to locate the config file")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(casebook::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(casebook::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidTransition { .. } | Self::UnknownAction { .. } => exit_code::REJECTED,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Unavailable { .. } | Self::Cancelled => exit_code::UNAVAILABLE,
            Self::Validation { .. }
            | Self::NoDataFile
            | Self::ConfigExists { .. }
            | Self::Config(ConfigError::Validation { .. } | ConfigError::UnknownView { .. }) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

/// The subcommand that owns records of `entity_type`.
pub fn command_for(entity_type: &str) -> &'static str {
    match entity_type {
        "claim" => "claims",
        "bid" => "bids",
        "notification" => "notifications",
        "subscription" => "subscriptions",
        "audit_log_entry" => "audit",
        _ => "stats",
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{} list", command_for(&entity_type)),
                resource_type: entity_type,
                identifier,
            },

            CoreError::InvalidTransition {
                entity_type,
                identifier,
                from,
                action,
            } => CliError::InvalidTransition {
                command: command_for(&entity_type).into(),
                resource_type: entity_type,
                identifier,
                from,
                action,
            },

            CoreError::UnknownAction {
                entity_type,
                action,
            } => CliError::UnknownAction {
                command: command_for(&entity_type).into(),
                resource_type: entity_type,
                action,
            },

            CoreError::Validation { field, reason } => CliError::Validation { field, reason },

            CoreError::ConcurrencyConflict {
                entity_type,
                identifier,
                expected,
                actual,
            } => CliError::Conflict {
                resource_type: entity_type,
                identifier,
                expected,
                actual,
            },

            CoreError::Cancelled => CliError::Cancelled,

            CoreError::ServiceStopped { entity_type } => CliError::Unavailable {
                resource_type: entity_type,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "service".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
