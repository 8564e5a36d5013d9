//! Migrate command handler
//!
//! Handles database migration operations including dry-run and rollback.
//! Migrations run through a blocking Diesel connection on the blocking
//! thread pool.

use diesel::Connection;
use diesel::migration::Migration;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;

use crate::config::settings::{DatabaseConfig, Settings};
use crate::db::MIGRATIONS;
use crate::error::{AppError, AppResult};

/// Handler for the migrate command
pub struct MigrateCommandHandler {
    settings: Settings,
}

impl MigrateCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Execute the migrate command with dry-run and rollback support.
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.settings.database.validate()?;

        if dry_run {
            return self.show_pending_migrations().await;
        }

        if let Some(steps) = rollback {
            self.rollback_migrations(steps).await
        } else {
            run_pending_migrations(&self.settings.database).await
        }
    }

    /// Show pending migrations without applying them.
    async fn show_pending_migrations(&self) -> AppResult<()> {
        println!("Checking for pending migrations...");

        let database_url = self.settings.database.url.clone();
        let pending: Vec<String> = run_blocking(move || {
            let mut conn = establish(&database_url)?;
            let migrations = conn
                .pending_migrations(MIGRATIONS)
                .map_err(migration_error)?;
            Ok(migrations
                .iter()
                .map(|migration| migration.name().to_string())
                .collect())
        })
        .await?;

        if pending.is_empty() {
            println!("No pending migrations");
        } else {
            println!("{} pending migration(s):", pending.len());
            for name in pending {
                println!("  {}", name);
            }
        }

        Ok(())
    }

    /// Roll back the given number of migrations.
    async fn rollback_migrations(&self, steps: u32) -> AppResult<()> {
        let database_url = self.settings.database.url.clone();
        let reverted: Vec<String> = run_blocking(move || {
            let mut conn = establish(&database_url)?;
            let mut reverted = Vec::new();
            for _ in 0..steps {
                let version = conn
                    .revert_last_migration(MIGRATIONS)
                    .map_err(migration_error)?;
                reverted.push(version.to_string());
            }
            Ok(reverted)
        })
        .await?;

        for version in &reverted {
            println!("Reverted migration {}", version);
        }
        tracing::info!(count = reverted.len(), "migrations reverted");

        Ok(())
    }
}

/// Applies all pending migrations. Also used by the server when
/// `database.auto_migrate` is enabled.
pub async fn run_pending_migrations(config: &DatabaseConfig) -> AppResult<()> {
    let database_url = config.url.clone();
    let applied: Vec<String> = run_blocking(move || {
        let mut conn = establish(&database_url)?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(migration_error)?;
        Ok(versions.iter().map(|version| version.to_string()).collect())
    })
    .await?;

    if applied.is_empty() {
        tracing::info!("no pending migrations");
    } else {
        tracing::info!(count = applied.len(), versions = ?applied, "migrations applied");
    }

    Ok(())
}

fn establish(database_url: &str) -> AppResult<PgConnection> {
    PgConnection::establish(database_url).map_err(|e| AppError::Database {
        operation: "establish migration connection".to_string(),
        source: anyhow::Error::from(e),
    })
}

fn migration_error(error: Box<dyn std::error::Error + Send + Sync>) -> AppError {
    AppError::Database {
        operation: "run migrations".to_string(),
        source: anyhow::anyhow!(error),
    }
}

async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })?
}
