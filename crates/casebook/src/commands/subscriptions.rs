//! Subscription command handlers.

use tabled::Tabled;

use casebook_core::{DataService, Subscription, Workspace};

use crate::cli::RecordArgs;
use crate::error::CliError;
use crate::output::{or_dash, paint_status};

use super::Ctx;
use super::records::{self, Listed};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct SubscriptionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Tenant")]
    tenant: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Seats")]
    seats: u32,
    #[tabled(rename = "Status")]
    status: String,
}

impl Listed for Subscription {
    type Row = SubscriptionRow;

    fn service(workspace: &Workspace) -> &DataService<Self> {
        workspace.subscriptions()
    }

    fn row(&self, color: bool) -> SubscriptionRow {
        SubscriptionRow {
            id: self.id.to_string(),
            tenant: self.tenant.clone(),
            plan: self.plan.to_string(),
            seats: self.seats,
            status: paint_status(&self.status.to_string(), color),
        }
    }

    fn detail(&self) -> String {
        [
            format!("ID:        {}", self.id),
            format!("Tenant:    {}", self.tenant),
            format!("Plan:      {}", self.plan),
            format!("Seats:     {}", self.seats),
            format!("Status:    {}", self.status),
            format!("Created:   {}", self.created_at.format("%Y-%m-%d")),
            format!(
                "Cancelled: {}",
                or_dash(self.cancelled_at.map(|t| t.format("%Y-%m-%d")))
            ),
        ]
        .join("\n")
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx, args: RecordArgs) -> Result<(), CliError> {
    records::handle::<Subscription>(ctx, args).await
}
