//! Configuration loader for chime-rs
//!
//! Provides the `ConfigLoader` struct that handles loading configuration
//! from multiple sources with proper precedence.

use std::path::PathBuf;

use config::{Config, Environment as EnvSource, File};

use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "CHIME_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "CHIME_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "CHIME";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// Sources, in order of priority:
/// 1. `default.toml` - Base default configuration (optional)
/// 2. `{environment}.toml` - Environment-specific configuration (optional)
/// 3. `local.toml` - Local development overrides (optional)
/// 4. `CHIME__*` environment variables (highest priority)
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: Environment,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// # Errors
    ///
    /// Returns an error if both `CHIME_CONFIG_DIR` and `CHIME_CONFIG_FILE`
    /// are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && std::env::var(CONFIG_DIR_ENV).is_ok() {
            return Err(ConfigError::mutual_exclusivity(
                "CHIME_CONFIG_DIR and CHIME_CONFIG_FILE cannot both be set. \
                 Use CHIME_CONFIG_DIR for layered configuration or \
                 CHIME_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir,
            config_file,
            environment: Environment::from_env(),
        })
    }

    /// Create a loader that reads exactly one configuration file.
    pub fn from_file(path: PathBuf) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path),
            environment: Environment::from_env(),
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Overrides the detected environment (e.g. from a CLI flag).
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Load configuration from all sources and validate the result.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Load configuration without validating it.
    ///
    /// CLI overrides may still fill in required values; validation runs
    /// again on the merged result.
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let mut builder = Config::builder();

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(ConfigError::FileNotFound(
                    config_file.display().to_string(),
                ));
            }
            builder = builder.add_source(File::from(config_file.clone()).required(true));
        } else {
            builder = builder
                .add_source(File::from(self.config_dir.join("default")).required(false))
                .add_source(
                    File::from(self.config_dir.join(self.environment.as_str())).required(false),
                )
                .add_source(File::from(self.config_dir.join("local")).required(false));
        }

        builder = builder.add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR),
        );

        builder.build().map_err(ConfigError::from)
    }
}
