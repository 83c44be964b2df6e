//! Audit log command handlers. The log is read-only from the CLI.

use tabled::Tabled;

use casebook_core::{AuditLogEntry, DataService, Workspace};

use crate::cli::{AuditArgs, AuditCommand};
use crate::error::CliError;
use crate::output::{or_dash, paint_status};

use super::Ctx;
use super::records::{self, Listed};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct AuditRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Actor")]
    actor: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Resource")]
    resource: String,
}

impl Listed for AuditLogEntry {
    type Row = AuditRow;

    fn service(workspace: &Workspace) -> &DataService<Self> {
        workspace.audit_log()
    }

    fn row(&self, color: bool) -> AuditRow {
        AuditRow {
            id: self.id.to_string(),
            time: self.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            severity: paint_status(&self.severity.to_string(), color),
            actor: self.actor.clone(),
            action: self.action.clone(),
            resource: self.resource.clone(),
        }
    }

    fn detail(&self) -> String {
        [
            format!("ID:       {}", self.id),
            format!("Time:     {}", self.created_at.format("%Y-%m-%d %H:%M:%S")),
            format!("Severity: {}", self.severity),
            format!("Actor:    {}", self.actor),
            format!("Action:   {}", self.action),
            format!("Resource: {}", self.resource),
            format!("Details:  {}", or_dash(self.details.as_deref())),
        ]
        .join("\n")
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx, args: AuditArgs) -> Result<(), CliError> {
    match args.command {
        AuditCommand::List(list_args) => records::list::<AuditLogEntry>(ctx, &list_args).await,
        AuditCommand::Get { id } => records::get::<AuditLogEntry>(ctx, &id).await,
    }
}
