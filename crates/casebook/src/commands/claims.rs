//! Claim command handlers.

use tabled::Tabled;

use casebook_core::{Claim, DataService, Workspace};

use crate::cli::RecordArgs;
use crate::error::CliError;
use crate::output::{grouped, or_dash, paint_status};

use super::Ctx;
use super::records::{self, Listed};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct ClaimRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Claimant")]
    claimant: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Claimed")]
    claimed: String,
    #[tabled(rename = "Admitted")]
    admitted: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
}

impl Listed for Claim {
    type Row = ClaimRow;

    fn service(workspace: &Workspace) -> &DataService<Self> {
        workspace.claims()
    }

    fn row(&self, color: bool) -> ClaimRow {
        ClaimRow {
            id: self.id.to_string(),
            claimant: self.claimant.clone(),
            category: self.category.clone(),
            claimed: grouped(self.claimed_amount),
            admitted: or_dash(self.admitted_amount.map(grouped)),
            status: paint_status(&self.status.to_string(), color),
            assignee: or_dash(self.assignee.as_deref()),
        }
    }

    fn detail(&self) -> String {
        let mut lines = vec![
            format!("ID:        {}", self.id),
            format!("Claimant:  {}", self.claimant),
            format!("Category:  {}", self.category),
            format!("Claimed:   {}", grouped(self.claimed_amount)),
            format!("Admitted:  {}", or_dash(self.admitted_amount.map(grouped))),
            format!("Status:    {}", self.status),
            format!("Assignee:  {}", or_dash(self.assignee.as_deref())),
        ];
        if let Some(ref reason) = self.rejection_reason {
            lines.push(format!("Rejected:  {reason}"));
        }
        lines.push(format!(
            "Created:   {}",
            self.created_at.format("%Y-%m-%d %H:%M")
        ));
        lines.push(format!(
            "Updated:   {}",
            self.updated_at.format("%Y-%m-%d %H:%M")
        ));
        lines.join("\n")
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx, args: RecordArgs) -> Result<(), CliError> {
    records::handle::<Claim>(ctx, args).await
}
