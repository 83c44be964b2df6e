//! Notification command handlers.

use tabled::Tabled;

use casebook_core::{DataService, Notification, Workspace};

use crate::cli::RecordArgs;
use crate::error::CliError;
use crate::output::{or_dash, paint_status};

use super::Ctx;
use super::records::{self, Listed};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct NotificationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl Listed for Notification {
    type Row = NotificationRow;

    fn service(workspace: &Workspace) -> &DataService<Self> {
        workspace.notifications()
    }

    fn row(&self, color: bool) -> NotificationRow {
        NotificationRow {
            id: self.id.to_string(),
            time: self.created_at.format("%Y-%m-%d %H:%M").to_string(),
            priority: self.priority.to_string(),
            title: self.title.clone(),
            status: paint_status(&self.status.to_string(), color),
        }
    }

    fn detail(&self) -> String {
        [
            format!("ID:       {}", self.id),
            format!("Title:    {}", self.title),
            format!("Priority: {}", self.priority),
            format!("Status:   {}", self.status),
            format!("Created:  {}", self.created_at.format("%Y-%m-%d %H:%M")),
            format!(
                "Read:     {}",
                or_dash(self.read_at.map(|t| t.format("%Y-%m-%d %H:%M")))
            ),
            String::new(),
            self.message.clone(),
        ]
        .join("\n")
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx, args: RecordArgs) -> Result<(), CliError> {
    records::handle::<Notification>(ctx, args).await
}
