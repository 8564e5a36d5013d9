//! Application state for the Axum web framework.
//!
//! Contains shared services and resources accessible across all request
//! handlers.

use std::sync::Arc;

use crate::db::AsyncDbPool;
use crate::queue::WorkQueue;
use crate::repositories::Repositories;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Designed for Axum's State extractor. Cloning is cheap since the services
/// and the pool use Arc internally.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Direct access to the database connection pool
    pub db_pool: AsyncDbPool,
}

impl AppState {
    /// Creates a new AppState from a database pool and a work queue handle.
    pub fn new(pool: AsyncDbPool, queue: Arc<dyn WorkQueue>) -> Self {
        let repos = Repositories::new(pool.clone());
        let services = Services::new(repos, queue);
        Self {
            services,
            db_pool: pool,
        }
    }
}
