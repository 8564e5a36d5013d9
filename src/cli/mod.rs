//! CLI module for chime-rs
//!
//! Argument parsing with clap, configuration loading and CLI overrides,
//! and command handlers for serve and migrate operations.

pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use executor::execute_command;
pub use parser::{Cli, Commands};

use crate::config::loader::ConfigLoader;
use crate::config::settings::Settings;
use crate::logger::{LogLevelHandle, init_logger};

/// Load configuration and apply CLI argument overrides.
///
/// Validation runs on the merged result so `--port` style flags can complete
/// an otherwise incomplete file.
pub fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut loader = match &cli.config {
        Some(path) => ConfigLoader::from_file(path.clone()),
        None => ConfigLoader::new()?,
    };
    if let Some(environment) = cli.env {
        loader = loader.with_environment(environment);
    }

    let mut settings = loader.load_unvalidated()?;
    apply_overrides(&mut settings, cli);
    settings.validate()?;

    Ok(settings)
}

/// Folds CLI flags into the loaded settings.
fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if cli.verbose {
        settings.logger.level = "debug".to_string();
    }
    if cli.quiet {
        settings.logger.level = "error".to_string();
    }

    if let Some(Commands::Serve { host, port, .. }) = &cli.command {
        if let Some(host) = host {
            settings.server.host = host.clone();
        }
        if let Some(port) = port {
            settings.server.port = *port;
        }
    }
}

/// Initialize the logger from settings.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<LogLevelHandle> {
    Ok(init_logger(&settings.logger)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/chime".to_string();
        settings
    }

    #[test]
    fn verbose_overrides_log_level() {
        let cli = Cli {
            command: None,
            config: None,
            env: None,
            verbose: true,
            quiet: false,
        };
        let mut settings = base_settings();
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings.logger.level, "debug");
    }

    #[test]
    fn serve_flags_override_bind_address() {
        let cli = Cli {
            command: Some(Commands::Serve {
                host: Some("0.0.0.0".to_string()),
                port: Some(9000),
                dry_run: false,
            }),
            config: None,
            env: None,
            verbose: false,
            quiet: false,
        };
        let mut settings = base_settings();
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9000);
    }
}
