//! Bid command handlers.

use tabled::Tabled;

use casebook_core::{Bid, DataService, Workspace};

use crate::cli::RecordArgs;
use crate::error::CliError;
use crate::output::{grouped, or_dash, paint_status};

use super::Ctx;
use super::records::{self, Listed};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct BidRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Bidder")]
    bidder: String,
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Invited")]
    invited: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl Listed for Bid {
    type Row = BidRow;

    fn service(workspace: &Workspace) -> &DataService<Self> {
        workspace.bids()
    }

    fn row(&self, color: bool) -> BidRow {
        BidRow {
            id: self.id.to_string(),
            bidder: self.bidder.clone(),
            asset: self.asset.clone(),
            amount: grouped(self.amount),
            invited: if self.invited { "yes" } else { "no" }.into(),
            status: paint_status(&self.status.to_string(), color),
        }
    }

    fn detail(&self) -> String {
        [
            format!("ID:        {}", self.id),
            format!("Bidder:    {}", self.bidder),
            format!("Asset:     {}", self.asset),
            format!("Amount:    {}", grouped(self.amount)),
            format!("Invited:   {}", if self.invited { "yes" } else { "no" }),
            format!("Status:    {}", self.status),
            format!("Note:      {}", or_dash(self.note.as_deref())),
            format!("Submitted: {}", self.submitted_at.format("%Y-%m-%d %H:%M")),
            format!("Updated:   {}", self.updated_at.format("%Y-%m-%d %H:%M")),
        ]
        .join("\n")
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx, args: RecordArgs) -> Result<(), CliError> {
    records::handle::<Bid>(ctx, args).await
}
