//! Configuration validation logic
//!
//! Validation methods for all configuration structures, keeping values in
//! acceptable ranges before anything connects or binds.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, LoggerSettings, QueueConfig, ServerConfig, Settings, WorkerConfig,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.allowed_origin.is_empty() {
            return Err(ConfigError::validation(
                "server.allowed_origin",
                "Allowed origin must not be empty.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL must not be empty. Set it in the configuration file or via CHIME__DATABASE__URL.",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Maximum connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Minimum connections cannot exceed maximum connections.",
            ));
        }

        Ok(())
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "queue.url",
                "Queue URL must not be empty.",
            ));
        }

        if self.key_prefix.is_empty() {
            return Err(ConfigError::validation(
                "queue.key_prefix",
                "Queue key prefix must not be empty.",
            ));
        }

        if self.lease_seconds == 0 {
            return Err(ConfigError::validation(
                "queue.lease_seconds",
                "Visibility lease must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl WorkerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::validation(
                "worker.concurrency",
                "Worker concurrency must be greater than 0.",
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::validation(
                "worker.poll_interval_ms",
                "Poll interval must be greater than 0 milliseconds.",
            ));
        }

        if self.batch_size == 0 {
            return Err(ConfigError::validation(
                "worker.batch_size",
                "Batch size must be greater than 0.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level".to_string(),
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.format".to_string(),
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate every configuration section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.queue.validate()?;
        self.worker.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/chime".to_string();
        settings
    }

    #[test]
    fn default_settings_with_database_url_are_valid() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn empty_database_url_is_rejected() {
        let settings = Settings::default();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. } if field == "database.url"));
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut settings = valid_settings();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn min_connections_above_max_is_rejected() {
        let mut settings = valid_settings();
        settings.database.min_connections = 50;
        settings.database.max_connections = 10;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_lease_is_rejected() {
        let mut settings = valid_settings();
        settings.queue.lease_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_worker_concurrency_is_rejected() {
        let mut settings = valid_settings();
        settings.worker.concurrency = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let mut settings = valid_settings();
        settings.logger.level = "verbose".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let mut settings = valid_settings();
        settings.logger.format = "xml".to_string();
        assert!(settings.validate().is_err());
    }
}
