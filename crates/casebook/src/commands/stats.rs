//! Collection statistics.

use tabled::Tabled;

use casebook_core::CollectionStats;

use crate::error::{CliError, command_for};
use crate::output;

use super::Ctx;

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Collection")]
    collection: &'static str,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "By")]
    grouped_by: &'static str,
    #[tabled(rename = "Counts")]
    counts: String,
}

impl StatsRow {
    fn new(stats: &CollectionStats, color: bool) -> Self {
        let counts = stats
            .counts
            .iter()
            .map(|(value, n)| format!("{}={n}", output::paint_status(value, color)))
            .collect::<Vec<_>>()
            .join("  ");
        Self {
            collection: command_for(stats.entity),
            total: stats.total,
            grouped_by: stats.grouped_by,
            counts,
        }
    }
}

pub fn handle(ctx: &Ctx) -> Result<(), CliError> {
    let stats = ctx.workspace.stats();
    let out = output::render_list(
        ctx.output,
        &stats,
        |s| StatsRow::new(s, ctx.color),
        |s| format!("{} {}", command_for(s.entity), s.total),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
