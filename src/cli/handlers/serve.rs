//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server
//! startup.

use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::server::Server;

/// Handler for the serve command
pub struct ServeCommandHandler {
    settings: Settings,
}

impl ServeCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Execute the serve command.
    ///
    /// With `dry_run`, validates the configuration and exits without
    /// starting the server.
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.settings)
            .run()
            .await
            .map_err(AppError::from)
    }

    /// Validate configuration without starting the server.
    fn validate_only(&self) -> AppResult<()> {
        self.settings.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.settings.server.address());
        println!("✓ Database URL is configured");
        println!("✓ Queue URL is configured: {}", self.settings.queue.url);
        println!(
            "✓ Worker pool: {} consumers, {}ms poll interval",
            self.settings.worker.concurrency, self.settings.worker.poll_interval_ms
        );
        println!("Dry run completed successfully - configuration is ready for deployment");

        Ok(())
    }
}
