//! Command dispatch: bridges CLI args -> workspace services -> output formatting.

pub mod audit;
pub mod bids;
pub mod claims;
pub mod config_cmd;
pub mod notifications;
pub mod records;
pub mod stats;
pub mod subscriptions;
pub mod util;

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::debug;

use casebook_config::Config;
use casebook_core::{Dataset, LatencyProfile, Workspace};

use crate::cli::{ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Everything a handler needs: the running workspace plus resolved
/// presentation settings.
pub struct Ctx {
    pub workspace: Workspace,
    pub config: Config,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    persist_to: Option<PathBuf>,
}

impl Ctx {
    /// Load the dataset and start every service.
    pub async fn open(global: &GlobalOpts, config: Config) -> Result<Self, CliError> {
        let mut service = config.service_config()?;
        if !global.latency {
            service.latency = LatencyProfile::NONE;
        }

        let data_path = global.data.clone().or_else(|| config.data.path.clone());
        let persist_to = if global.persist || config.data.persist {
            Some(data_path.clone().ok_or(CliError::NoDataFile)?)
        } else {
            None
        };
        let dataset = match data_path {
            Some(ref path) => util::read_dataset(path)?,
            None => Dataset::demo()?,
        };

        let output = match global.output {
            Some(format) => format,
            None => parse_setting::<OutputFormat>("defaults.output", &config.defaults.output)?,
        };
        let color_mode = match global.color {
            Some(mode) => mode,
            None => parse_setting::<ColorMode>("defaults.color", &config.defaults.color)?,
        };

        let workspace = Workspace::new(service);
        workspace.init(dataset).await?;

        Ok(Self {
            workspace,
            config,
            output,
            color: output::should_color(color_mode),
            quiet: global.quiet,
            persist_to,
        })
    }

    /// Write the dataset back when persistence is on. Called after every
    /// successful mutation.
    pub fn persist(&self) -> Result<(), CliError> {
        let Some(ref path) = self.persist_to else {
            return Ok(());
        };
        let json = self.workspace.export().to_json_pretty()?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "dataset written");
        Ok(())
    }

    pub async fn close(&self) {
        self.workspace.shutdown().await;
    }
}

fn parse_setting<V: ValueEnum>(field: &str, raw: &str) -> Result<V, CliError> {
    V::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Dispatch a workspace-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Ctx) -> Result<(), CliError> {
    match cmd {
        Command::Claims(args) => claims::handle(ctx, args).await,
        Command::Bids(args) => bids::handle(ctx, args).await,
        Command::Notifications(args) => notifications::handle(ctx, args).await,
        Command::Subscriptions(args) => subscriptions::handle(ctx, args).await,
        Command::Audit(args) => audit::handle(ctx, args).await,
        Command::Stats => stats::handle(ctx),
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions run without a workspace".into(),
        )),
    }
}
