//! Shared configuration for casebook.
//!
//! TOML file at the platform config dir, `CASEBOOK_` environment
//! overrides, named saved views, and translation to
//! `casebook_core::ServiceConfig`. The core never reads config files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use casebook_core::{LatencyProfile, QueryState, ServiceConfig};

/// Environment prefix. Nested keys use `__`:
/// `CASEBOOK_SERVICE__LATENCY_MAX_MS=0`.
pub const ENV_PREFIX: &str = "CASEBOOK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no saved view named '{name}'")]
    UnknownView { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Output and paging defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Simulated-backend tuning.
    #[serde(default)]
    pub service: ServiceSettings,

    /// Where the dataset lives.
    #[serde(default)]
    pub data: DataSettings,

    /// Named, saved list queries.
    #[serde(default)]
    pub views: BTreeMap<String, SavedView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_page_size() -> usize {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceSettings {
    /// Lower bound of the simulated latency band, in milliseconds.
    #[serde(default = "default_latency_min")]
    pub latency_min_ms: u64,

    /// Upper bound; `0` disables simulated latency.
    #[serde(default = "default_latency_max")]
    pub latency_max_ms: u64,

    #[serde(default = "default_queue_size")]
    pub write_queue_size: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            latency_min_ms: default_latency_min(),
            latency_max_ms: default_latency_max(),
            write_queue_size: default_queue_size(),
        }
    }
}

fn default_latency_min() -> u64 {
    200
}
fn default_latency_max() -> u64 {
    1500
}
fn default_queue_size() -> usize {
    64
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DataSettings {
    /// Dataset JSON to load instead of the built-in demo.
    pub path: Option<PathBuf>,

    /// Write the dataset back to `path` after every mutation.
    #[serde(default)]
    pub persist: bool,
}

/// A list query saved under a name, e.g. `[views.my-pending]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SavedView {
    /// Collection the view applies to: `claims`, `bids`, ...
    pub entity: String,

    #[serde(default)]
    pub query: QueryState,
}

impl Config {
    /// Build the core service configuration, validating the latency band.
    pub fn service_config(&self) -> Result<ServiceConfig, ConfigError> {
        let s = &self.service;
        if s.latency_min_ms > s.latency_max_ms {
            return Err(invalid(
                "service.latency_min_ms",
                format!(
                    "{} exceeds latency_max_ms ({})",
                    s.latency_min_ms, s.latency_max_ms
                ),
            ));
        }
        if s.write_queue_size == 0 {
            return Err(invalid("service.write_queue_size", "must be at least 1"));
        }
        if self.defaults.page_size == 0 {
            return Err(invalid("defaults.page_size", "must be at least 1"));
        }

        let latency = LatencyProfile::new(
            Duration::from_millis(s.latency_min_ms),
            Duration::from_millis(s.latency_max_ms),
        )
        .map_err(|e| invalid("service", e.to_string()))?;

        Ok(ServiceConfig {
            latency,
            write_queue_size: s.write_queue_size,
            default_page_size: self.defaults.page_size,
        })
    }

    /// Look up a saved view, checking it targets `entity`.
    pub fn view(&self, name: &str, entity: &str) -> Result<&SavedView, ConfigError> {
        let view = self
            .views
            .get(name)
            .ok_or_else(|| ConfigError::UnknownView { name: name.into() })?;
        if view.entity != entity {
            return Err(invalid(
                "view",
                format!("'{name}' is a {} view, not {entity}", view.entity),
            ));
        }
        Ok(view)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "casebook", "casebook").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("casebook");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an
/// error; defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use casebook_core::{FilterValue, SortOrder};
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_the_simulated_backend() {
        let service = Config::default().service_config().unwrap();
        assert_eq!(service.latency.min, Duration::from_millis(200));
        assert_eq!(service.latency.max, Duration::from_millis(1500));
        assert_eq!(service.write_queue_size, 64);
        assert_eq!(service.default_page_size, 10);
    }

    #[test]
    fn inverted_latency_band_is_rejected() {
        let mut cfg = Config::default();
        cfg.service.latency_min_ms = 900;
        cfg.service.latency_max_ms = 100;
        assert!(matches!(
            cfg.service_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "service.latency_min_ms"
        ));
    }

    #[test]
    fn file_and_env_layer_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "casebook.toml",
                r#"
                [defaults]
                output = "json"

                [service]
                latency_min_ms = 0
                latency_max_ms = 50

                [views.pending-claims]
                entity = "claims"

                [views.pending-claims.query]
                tab = "pending"
                sort_key = "claimed_amount"
                sort_order = "desc"

                [views.pending-claims.query.filters]
                category = ["secured", "preferential"]
                "#,
            )?;
            jail.set_env("CASEBOOK_SERVICE__LATENCY_MAX_MS", "0");
            jail.set_env("CASEBOOK_DEFAULTS__PAGE_SIZE", "25");

            let cfg = load_config_from(Path::new("casebook.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.color, "auto");
            assert_eq!(cfg.defaults.page_size, 25);
            assert_eq!(cfg.service.latency_max_ms, 0);

            let service = cfg.service_config().map_err(|e| e.to_string())?;
            assert!(service.latency.is_disabled());

            let view = cfg
                .view("pending-claims", "claims")
                .map_err(|e| e.to_string())?;
            assert_eq!(view.query.tab.as_deref(), Some("pending"));
            assert_eq!(view.query.sort_order, SortOrder::Desc);
            assert_eq!(view.query.page, 1);
            assert_eq!(
                view.query.filters.get("category"),
                Some(&FilterValue::AnyOf(vec![
                    "secured".into(),
                    "preferential".into()
                ]))
            );
            assert!(cfg.view("pending-claims", "bids").is_err());
            assert!(matches!(
                cfg.view("nope", "claims"),
                Err(ConfigError::UnknownView { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let cfg = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn saved_config_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.data.path = Some(PathBuf::from("/srv/casebook/data.json"));
        cfg.data.persist = true;
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let reloaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(reloaded, cfg);
    }
}
