//! Shared helpers for command handlers.

use std::path::Path;

use serde::de::DeserializeOwned;

use casebook_core::Dataset;

use crate::error::CliError;

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<D: DeserializeOwned>(path: &Path) -> Result<D, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}

/// Load a dataset document for `--data`.
pub fn read_dataset(path: &Path) -> Result<Dataset, CliError> {
    let load = || -> Result<Dataset, Box<dyn std::error::Error + Send + Sync>> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    };
    load().map_err(|source| CliError::DataFile {
        path: path.to_path_buf(),
        source,
    })
}
