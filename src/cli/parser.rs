//! CLI argument parsing with clap
//!
//! Defines the command-line interface structure, including all commands,
//! arguments, and their documentation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// Include shadow-rs generated build information
use shadow_rs::shadow;
shadow!(build);

/// A task scheduling service for one-time and recurring tasks
#[derive(Parser, Debug)]
#[command(name = "chime-rs")]
#[command(about = "A task scheduling service for one-time and recurring tasks")]
#[command(long_about = "
Chime-rs runs user-defined tasks at the right moment: one-time tasks at an
absolute timestamp, recurring tasks per a five-field cron rule. Tasks are
managed over a REST API, persisted in PostgreSQL, and queued for execution
in a Redis-backed scheduled work queue consumed by an in-process worker pool.

EXAMPLES:
    # Start the server with default configuration
    chime-rs serve

    # Start the server on a custom host and port
    chime-rs serve --host 0.0.0.0 --port 8080

    # Use a single configuration file
    chime-rs --config /etc/chime-rs/production.toml serve

    # Check configuration without starting the server
    chime-rs serve --dry-run

    # Run database migrations
    chime-rs migrate

    # Preview pending migrations
    chime-rs migrate --dry-run
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Use a single TOML file instead of the layered `config/` directory.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Forces a specific environment configuration instead of reading
    /// CHIME_APP_ENV. Affects which configuration files are loaded.
    #[arg(short, long, value_parser = super::validation::parse_environment)]
    pub env: Option<crate::config::Environment>,

    /// Enable verbose logging (debug level). Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output. Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    Serve {
        /// Host address to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Validate configuration and exit without starting the server
        #[arg(long)]
        dry_run: bool,
    },

    /// Run database migrations
    Migrate {
        /// Show pending migrations without applying them
        #[arg(long)]
        dry_run: bool,

        /// Roll back the given number of migrations instead of applying
        #[arg(long, value_name = "STEPS")]
        rollback: Option<u32>,
    },
}
