//! Service layer for business logic operations.

mod task_service;

pub use task_service::TaskService;

use std::sync::Arc;

use crate::queue::WorkQueue;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Designed for use as Axum application state; cloning is cheap since the
/// underlying handles use `Arc` internally.
#[derive(Clone)]
pub struct Services {
    pub tasks: TaskService,
}

impl Services {
    pub fn new(repos: Repositories, queue: Arc<dyn WorkQueue>) -> Self {
        Self {
            tasks: TaskService::new(Arc::new(repos.tasks), queue),
        }
    }
}
