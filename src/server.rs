//! Server module for managing HTTP server lifecycle
//!
//! Handles startup (pool, queue, reconcile, worker pool, router) and
//! graceful shutdown: the HTTP listener drains first, then the worker pool.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::{Environment, settings::Settings};
use crate::db::establish_async_connection_pool;
use crate::queue::RedisWorkQueue;
use crate::repositories::{TaskRepository, TaskStore};
use crate::scheduler::WorkerPool;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            allowed_origin = %self.settings.server.allowed_origin,
            "Server configuration loaded"
        );

        tracing::info!(
            max_connections = %self.settings.database.max_connections,
            min_connections = %self.settings.database.min_connections,
            auto_migrate = %self.settings.database.auto_migrate,
            "Database configuration loaded"
        );

        tracing::info!(
            key_prefix = %self.settings.queue.key_prefix,
            lease_seconds = %self.settings.queue.lease_seconds,
            worker_enabled = %self.settings.worker.enabled,
            "Queue configuration loaded"
        );

        tracing::info!("Initializing database connection pool...");
        let pool = establish_async_connection_pool(&self.settings.database).await?;
        tracing::info!("Database connection pool initialized");

        if self.settings.database.auto_migrate {
            crate::cli::handlers::migrate::run_pending_migrations(&self.settings.database).await?;
            tracing::info!("Pending migrations applied");
        }

        tracing::info!("Connecting to the scheduled work queue...");
        let queue = Arc::new(RedisWorkQueue::new(&self.settings.queue).await?);
        tracing::info!("Scheduled work queue connected");

        let state = AppState::new(pool.clone(), queue.clone());

        if self.settings.worker.reconcile_on_start {
            state.services.tasks.reconcile().await?;
        }

        let workers = if self.settings.worker.enabled {
            let store: Arc<dyn TaskStore> = Arc::new(TaskRepository::new(pool.clone()));
            Some(WorkerPool::start(queue, store, &self.settings.worker))
        } else {
            tracing::warn!("execution workers disabled, due tasks will not run in this process");
            None
        };

        let router = create_router(state, &self.settings.server)?;
        tracing::info!("Router configured");

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Some(workers) = workers {
            workers.shutdown().await;
        }

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
