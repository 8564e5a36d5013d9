//! Repository layer for data access operations.

mod task_repo;

pub use task_repo::{TaskRepository, TaskStore};

#[cfg(test)]
pub use task_repo::testing;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Since `AsyncDbPool` uses `Arc` internally, cloning is cheap.
#[derive(Clone)]
pub struct Repositories {
    pub tasks: TaskRepository,
}

impl Repositories {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            tasks: TaskRepository::new(pool),
        }
    }
}
