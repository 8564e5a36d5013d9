//! Validation helpers for CLI argument parsing.

use std::path::PathBuf;

use crate::config::Environment;

/// Validates a `--config` path: it must exist and be a TOML file.
pub fn validate_config_file_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);

    if !path.exists() {
        return Err(format!("configuration file '{}' does not exist", value));
    }
    if !path.is_file() {
        return Err(format!("'{}' is not a file", value));
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
        return Err(format!("configuration file '{}' must be a .toml file", value));
    }

    Ok(path)
}

/// Parses `--env` into an [`Environment`].
pub fn parse_environment(value: &str) -> Result<Environment, String> {
    value.parse::<Environment>().map_err(|e| e.to_string())
}
