//! Config subcommand handlers. These run without loading a dataset.

use std::path::PathBuf;

use tabled::Tabled;

use casebook_config::{self as config, Config, ConfigError};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ViewRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Tab")]
    tab: String,
    #[tabled(rename = "Sort")]
    sort: String,
    #[tabled(rename = "Filters")]
    filters: usize,
}

/// `--config`, or the platform default.
pub fn resolve_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = resolve_path(global);
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_from(&path)?;
            let out = match global.output {
                Some(OutputFormat::Json) => output::render_json(&cfg, false)?,
                Some(OutputFormat::JsonCompact) => output::render_json(&cfg, true)?,
                Some(OutputFormat::Yaml) => output::render_yaml(&cfg)?,
                _ => toml::to_string_pretty(&cfg).map_err(ConfigError::from)?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists { path });
            }
            config::save_config_to(&Config::default(), &path)?;
            output::print_note(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }

        ConfigCommand::Views => {
            let cfg = config::load_config_from(&path)?;
            let format = global.output.unwrap_or(OutputFormat::Table);
            let out = match format {
                OutputFormat::Table | OutputFormat::Plain => {
                    let views: Vec<_> = cfg.views.iter().collect();
                    output::render_list(
                        format,
                        &views,
                        |(name, view)| ViewRow {
                            name: (*name).clone(),
                            entity: view.entity.clone(),
                            tab: output::or_dash(view.query.tab.as_deref()),
                            sort: view.query.sort_key.as_deref().map_or_else(
                                || "-".into(),
                                |key| format!("{key} {}", view.query.sort_order),
                            ),
                            filters: view.query.filters.iter().count(),
                        },
                        |(name, _)| (*name).clone(),
                    )?
                }
                _ => output::render_single(
                    format,
                    &cfg.views,
                    |_| String::new(),
                    |_| String::new(),
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
