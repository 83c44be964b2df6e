//! Handlers shared by every record collection.
//!
//! Each entity module supplies a table row, a detail view and its service
//! through [`Listed`]; the list/get/write flows live here once.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tabled::Tabled;

use casebook_core::{
    DataService, EntityId, FilterSet, Lifecycle, Preset, QueryState, Record, SortOrder,
    TransitionPayload, Workspace,
};

use crate::cli::{ListArgs, OutputFormat, RecordArgs, RecordCommand};
use crate::error::{CliError, command_for};
use crate::output;

use super::{Ctx, util};

/// A record type the CLI can list and show.
pub trait Listed: Preset + Serialize {
    type Row: Tabled;

    fn service(workspace: &Workspace) -> &DataService<Self>;

    fn row(&self, color: bool) -> Self::Row;

    fn detail(&self) -> String;
}

// ── Reads ───────────────────────────────────────────────────────────

pub async fn list<T: Listed>(ctx: &Ctx, args: &ListArgs) -> Result<(), CliError> {
    let query = T::list_query();
    let state = query_state::<T>(ctx, args)?;
    query.validate(&state)?;

    let result = T::service(&ctx.workspace).list(None).await;
    let view = query.derive(&result.data, &state);

    let out = output::render_list(
        ctx.output,
        &view.items,
        |r| r.row(ctx.color),
        |r| r.id().to_string(),
    )?;
    output::print_output(&out, ctx.quiet);
    if ctx.output == OutputFormat::Table {
        output::print_note(
            &format!(
                "page {} of {} ({} matching, {} total)",
                view.page,
                view.total_pages.max(1),
                view.total_matches,
                result.total
            ),
            ctx.quiet,
        );
    }
    Ok(())
}

/// Saved view (or defaults), then flags layered on top.
fn query_state<T: Listed>(ctx: &Ctx, args: &ListArgs) -> Result<QueryState, CliError> {
    let mut state = match args.view {
        Some(ref name) => ctx.config.view(name, command_for(T::KIND))?.query.clone(),
        None => T::service(&ctx.workspace).query_state(),
    };
    if let Some(ref term) = args.search {
        state.set_search(term.as_str());
    }
    for raw in &args.filter {
        let (key, value) = FilterSet::parse_pair(raw)?;
        state.set_filter(key, value);
    }
    if let Some(ref tab) = args.tab {
        state.set_tab(Some(tab.clone()).filter(|t| t != "all"));
    }
    let order = if args.desc {
        SortOrder::Desc
    } else {
        SortOrder::Asc
    };
    match args.sort {
        Some(ref key) => state.set_sort(key.as_str(), order),
        None if args.desc => state.sort_order = SortOrder::Desc,
        None => {}
    }
    if let Some(size) = args.page_size {
        state.set_page_size(size);
    }
    if let Some(page) = args.page {
        state.set_page(page);
    }
    Ok(state)
}

pub async fn get<T: Listed>(ctx: &Ctx, id: &str) -> Result<(), CliError> {
    let record = fetch::<T>(ctx, id).await?;
    show(ctx, record.as_ref())
}

async fn fetch<T: Listed>(ctx: &Ctx, id: &str) -> Result<Arc<T>, CliError> {
    T::service(&ctx.workspace)
        .get_by_id(&EntityId::from(id))
        .await
        .ok_or_else(|| CliError::NotFound {
            resource_type: T::KIND.into(),
            identifier: id.into(),
            list_command: format!("{} list", command_for(T::KIND)),
        })
}

fn show<T: Listed>(ctx: &Ctx, record: &T) -> Result<(), CliError> {
    let out = output::render_single(ctx.output, record, T::detail, |r| r.id().to_string())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Lifecycle records ───────────────────────────────────────────────

/// Full command set for a collection with a status machine.
pub async fn handle<T>(ctx: &Ctx, args: RecordArgs) -> Result<(), CliError>
where
    T: Listed + Lifecycle,
    T::Draft: DeserializeOwned,
    T::Patch: DeserializeOwned,
{
    let service = T::service(&ctx.workspace);
    match args.command {
        RecordCommand::List(list_args) => list::<T>(ctx, &list_args).await,

        RecordCommand::Get { id } => get::<T>(ctx, &id).await,

        RecordCommand::Create { from_file } => {
            let draft: T::Draft = util::read_json_file(&from_file)?;
            let record = service.create(draft).await?;
            ctx.persist()?;
            output::print_note(&format!("Created {} {}", T::KIND, record.id()), ctx.quiet);
            show(ctx, record.as_ref())
        }

        RecordCommand::Update {
            id,
            from_file,
            revision,
        } => {
            let patch: T::Patch = util::read_json_file(&from_file)?;
            let id = EntityId::from(id);
            let record = match revision {
                Some(expected) => service.update_if_revision(&id, expected, patch).await?,
                None => service.update(&id, patch).await?,
            };
            ctx.persist()?;
            show(ctx, record.as_ref())
        }

        RecordCommand::Transition {
            id,
            action,
            actor,
            note,
            amount,
        } => {
            let payload = TransitionPayload {
                actor,
                note,
                amount,
            };
            let record = service
                .transition_named(&EntityId::from(id), &action, payload)
                .await?;
            ctx.persist()?;
            output::print_note(
                &format!("{} {} is now {}", T::KIND, record.id(), record.status()),
                ctx.quiet,
            );
            show(ctx, record.as_ref())
        }

        RecordCommand::Actions { id } => actions::<T>(ctx, &id).await,

        RecordCommand::Remove { id } => {
            if !service.remove(&EntityId::from(id.as_str())).await? {
                return Err(CliError::NotFound {
                    resource_type: T::KIND.into(),
                    identifier: id,
                    list_command: format!("{} list", command_for(T::KIND)),
                });
            }
            ctx.persist()?;
            output::print_note(&format!("Removed {} {id}", T::KIND), ctx.quiet);
            Ok(())
        }
    }
}

#[derive(Clone, Serialize, Tabled)]
struct ActionRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Leads to")]
    leads_to: String,
}

async fn actions<T: Listed + Lifecycle>(ctx: &Ctx, id: &str) -> Result<(), CliError> {
    let record = fetch::<T>(ctx, id).await?;
    let from = record.status();
    let rows: Vec<ActionRow> = T::allowed_actions(from)
        .into_iter()
        .filter_map(|action| {
            T::next_status(from, action).map(|to| ActionRow {
                action: action.to_string(),
                leads_to: to.to_string(),
            })
        })
        .collect();

    if rows.is_empty() && ctx.output == OutputFormat::Table {
        output::print_note(&format!("{} {id} is {from}: no actions left", T::KIND), ctx.quiet);
        return Ok(());
    }
    let out = output::render_list(ctx.output, &rows, ActionRow::clone, |r| r.action.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
