//! Task repository for async database operations.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewTask, Task, TaskChangeset};
use crate::schema::tasks;

/// Durable record storage for tasks, keyed by id.
///
/// The scheduling core only depends on this seam; the Diesel-backed
/// [`TaskRepository`] is the production implementation.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, new_task: NewTask) -> AppResult<Task>;
    async fn find_by_id(&self, task_id: i32) -> AppResult<Option<Task>>;
    async fn list_all(&self) -> AppResult<Vec<Task>>;
    async fn update(&self, task_id: i32, changeset: TaskChangeset) -> AppResult<Task>;
    async fn delete(&self, task_id: i32) -> AppResult<()>;

    /// Marks the task's side effect as done. Tolerates a concurrently
    /// deleted row; redelivery makes this idempotent.
    async fn mark_executed(&self, task_id: i32) -> AppResult<()>;
}

/// Task repository holding an async connection pool.
///
/// `AsyncDbPool` (bb8::Pool) uses `Arc` internally, so cloning is cheap.
#[derive(Clone)]
pub struct TaskRepository {
    pool: AsyncDbPool,
}

impl TaskRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> AppResult<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>,
    > {
        self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn create(&self, new_task: NewTask) -> AppResult<Task> {
        let mut conn = self.conn().await?;

        diesel::insert_into(tasks::table)
            .values(&new_task)
            .returning(Task::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, task_id: i32) -> AppResult<Option<Task>> {
        let mut conn = self.conn().await?;

        tasks::table
            .find(task_id)
            .select(Task::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list_all(&self) -> AppResult<Vec<Task>> {
        let mut conn = self.conn().await?;

        tasks::table
            .order(tasks::id.asc())
            .select(Task::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn update(&self, task_id: i32, changeset: TaskChangeset) -> AppResult<Task> {
        let mut conn = self.conn().await?;

        diesel::update(tasks::table.find(task_id))
            .set(&changeset)
            .returning(Task::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => AppError::task_not_found(),
                other => AppError::from(other),
            })
    }

    async fn delete(&self, task_id: i32) -> AppResult<()> {
        let mut conn = self.conn().await?;

        let deleted = diesel::delete(tasks::table.find(task_id))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        if deleted == 0 {
            Err(AppError::task_not_found())
        } else {
            Ok(())
        }
    }

    async fn mark_executed(&self, task_id: i32) -> AppResult<()> {
        let mut conn = self.conn().await?;

        let updated = diesel::update(tasks::table.find(task_id))
            .set(tasks::executed.eq(true))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        if updated == 0 {
            tracing::debug!(task_id, "mark_executed hit a deleted task, ignoring");
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory [`TaskStore`] double for coordinator and worker tests.

    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;

    use super::TaskStore;
    use crate::error::{AppError, AppResult};
    use crate::models::{NewTask, Task, TaskChangeset};

    #[derive(Default)]
    pub struct InMemoryTaskStore {
        state: Mutex<(BTreeMap<i32, Task>, i32)>,
    }

    impl InMemoryTaskStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl TaskStore for InMemoryTaskStore {
        async fn create(&self, new_task: NewTask) -> AppResult<Task> {
            let mut state = self.state.lock().await;
            state.1 += 1;
            let now = Utc::now();
            let task = Task {
                id: state.1,
                kind: new_task.kind,
                cron: new_task.cron,
                scheduled_time: new_task.scheduled_time,
                executed: false,
                created_at: now,
                updated_at: now,
            };
            state.0.insert(task.id, task.clone());
            Ok(task)
        }

        async fn find_by_id(&self, task_id: i32) -> AppResult<Option<Task>> {
            let state = self.state.lock().await;
            Ok(state.0.get(&task_id).cloned())
        }

        async fn list_all(&self) -> AppResult<Vec<Task>> {
            let state = self.state.lock().await;
            Ok(state.0.values().cloned().collect())
        }

        async fn update(&self, task_id: i32, changeset: TaskChangeset) -> AppResult<Task> {
            let mut state = self.state.lock().await;
            let task = state
                .0
                .get_mut(&task_id)
                .ok_or_else(AppError::task_not_found)?;
            task.kind = changeset.kind;
            task.cron = changeset.cron;
            task.scheduled_time = changeset.scheduled_time;
            task.updated_at = Utc::now();
            Ok(task.clone())
        }

        async fn delete(&self, task_id: i32) -> AppResult<()> {
            let mut state = self.state.lock().await;
            state
                .0
                .remove(&task_id)
                .map(|_| ())
                .ok_or_else(AppError::task_not_found)
        }

        async fn mark_executed(&self, task_id: i32) -> AppResult<()> {
            let mut state = self.state.lock().await;
            if let Some(task) = state.0.get_mut(&task_id) {
                task.executed = true;
                task.updated_at = Utc::now();
            }
            Ok(())
        }
    }
}
