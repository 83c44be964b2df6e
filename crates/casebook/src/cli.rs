//! Clap derive structures for the `casebook` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// casebook -- work an insolvency case file from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "casebook",
    version,
    about = "Browse and work case files from the command line",
    long_about = "Lists, filters and drives the lifecycle of claims, bids,\n\
        notifications and subscriptions held in a casebook dataset.\n\n\
        Without --data the built-in demo case file is loaded.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "CASEBOOK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Dataset JSON to load instead of the demo case file
    #[arg(long, short = 'd', env = "CASEBOOK_DATA_FILE", global = true)]
    pub data: Option<PathBuf>,

    /// Write the dataset back to --data after a change
    #[arg(long, global = true)]
    pub persist: bool,

    /// Pay the configured simulated latency on every call
    #[arg(long, global = true)]
    pub latency: bool,

    /// Output format (defaults to the config file's setting)
    #[arg(long, short = 'o', env = "CASEBOOK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Creditor claims and their adjudication
    #[command(alias = "cl")]
    Claims(RecordArgs),

    /// Purchase bids on estate assets
    #[command(alias = "b")]
    Bids(RecordArgs),

    /// Inbox notifications
    #[command(alias = "ntf")]
    Notifications(RecordArgs),

    /// Tenant subscriptions
    #[command(alias = "subs")]
    Subscriptions(RecordArgs),

    /// Browse the audit log
    Audit(AuditArgs),

    /// Status and severity counts per collection
    Stats,

    /// Manage CLI configuration and saved views
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Search, filter, sort and paging flags shared by every list command.
#[derive(Debug, Default, Args)]
pub struct ListArgs {
    /// Case-insensitive substring over the searchable fields
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Field filter, repeatable: --filter status=open,accepted
    #[arg(long, short = 'f', value_name = "KEY=V1[,V2]")]
    pub filter: Vec<String>,

    /// Named tab, or "all"
    #[arg(long, short = 't')]
    pub tab: Option<String>,

    /// Sort column
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page number (1-based; clamped to the last page)
    #[arg(long, short = 'p')]
    pub page: Option<usize>,

    /// Rows per page
    #[arg(long, short = 'n')]
    pub page_size: Option<usize>,

    /// Start from a saved view in the config file
    #[arg(long)]
    pub view: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RECORDS (claims, bids, notifications, subscriptions)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub command: RecordCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// List records
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one record
    Get {
        /// Record id
        id: String,
    },

    /// Create a record from a JSON draft
    Create {
        /// JSON file holding the draft
        #[arg(long, short = 'F')]
        from_file: PathBuf,
    },

    /// Merge a JSON patch into a record
    Update {
        /// Record id
        id: String,

        /// JSON file holding the patch
        #[arg(long, short = 'F')]
        from_file: PathBuf,

        /// Only apply if the record is still at this revision
        #[arg(long)]
        revision: Option<u64>,
    },

    /// Apply a lifecycle action (e.g. submit, admit, mark_read)
    Transition {
        /// Record id
        id: String,

        /// Action name
        action: String,

        /// Who is acting
        #[arg(long)]
        actor: Option<String>,

        /// Free-text note or reason
        #[arg(long)]
        note: Option<String>,

        /// Amount carried by the action
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<i64>,
    },

    /// Show the actions allowed from a record's current status
    Actions {
        /// Record id
        id: String,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Remove {
        /// Record id
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUDIT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// List audit entries
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one audit entry
    Get {
        /// Entry id
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the resolved configuration
    Show,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List saved views
    Views,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
