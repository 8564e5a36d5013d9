//! Task lifecycle coordination between the task store and the work queue.
//!
//! The store owns persisted state; the queue holds a derived trigger entry
//! per task. The two are updated sequentially, never transactionally: old
//! trigger removal comes before the persistence change, re-enqueueing after
//! it. The worker's missing-task check and the startup reconcile pass repair
//! the windows that ordering leaves open.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{Task, TaskDefinition, TaskKind};
use crate::queue::WorkQueue;
use crate::repositories::TaskStore;
use crate::scheduler::{Recurrence, TaskMessage, Trigger, TriggerKey};

/// Coordinates create/update/delete across the task store and the
/// scheduled work queue.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    queue: Arc<dyn WorkQueue>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, queue: Arc<dyn WorkQueue>) -> Self {
        Self { store, queue }
    }

    /// Persists a new task and arms its trigger.
    pub async fn create(&self, definition: TaskDefinition) -> AppResult<Task> {
        let task = self.store.create(definition.new_task()).await?;
        self.arm(task.trigger_key(), definition.trigger()).await?;

        tracing::info!(task_id = task.id, kind = %task.kind, "task created");
        Ok(task)
    }

    /// Lists all tasks in id order.
    pub async fn list(&self) -> AppResult<Vec<Task>> {
        self.store.list_all().await
    }

    /// Replaces a task's definition and swaps its trigger.
    ///
    /// The old trigger is removed under the task's pre-update key: a kind
    /// change moves the entry from e.g. `one-time-1` to `recurring-1`.
    pub async fn update(&self, task_id: i32, definition: TaskDefinition) -> AppResult<Task> {
        let existing = self
            .store
            .find_by_id(task_id)
            .await?
            .ok_or_else(AppError::task_not_found)?;

        self.queue
            .remove(&existing.trigger_key().to_string())
            .await?;

        let task = self.store.update(task_id, definition.changeset()).await?;
        self.arm(task.trigger_key(), definition.trigger()).await?;

        tracing::info!(task_id = task.id, kind = %task.kind, "task updated");
        Ok(task)
    }

    /// Removes a task's trigger and destroys the persisted record.
    pub async fn delete(&self, task_id: i32) -> AppResult<()> {
        let existing = self
            .store
            .find_by_id(task_id)
            .await?
            .ok_or_else(AppError::task_not_found)?;

        self.queue
            .remove(&existing.trigger_key().to_string())
            .await?;
        self.store.delete(task_id).await?;

        tracing::info!(task_id, "task deleted");
        Ok(())
    }

    async fn arm(&self, key: TriggerKey, trigger: Trigger) -> AppResult<()> {
        let message = TaskMessage {
            task_id: key.task_id(),
        };
        let key = key.to_string();

        match trigger {
            Trigger::Once { fire_at } => {
                self.queue.enqueue_once(&key, message, fire_at).await?;
                tracing::debug!(%key, %fire_at, "one-time trigger armed");
            }
            Trigger::Repeating { rule } => {
                if let Some(recurrence) = Recurrence::from_rule(&rule) {
                    tracing::debug!(%key, schedule = %recurrence, "recurring trigger armed");
                }
                self.queue.enqueue_repeating(&key, message, rule).await?;
            }
        }
        Ok(())
    }

    /// Re-aligns the queue with the store after a restart.
    ///
    /// Live tasks missing an entry are re-armed (executed one-time tasks are
    /// done and stay unarmed); entries whose task is gone are removed.
    pub async fn reconcile(&self) -> AppResult<()> {
        let tasks = self.store.list_all().await?;
        let live: HashSet<String> = self.queue.live_keys().await?.into_iter().collect();

        let mut expected: HashSet<String> = HashSet::new();
        let mut armed = 0usize;

        for task in &tasks {
            if task.kind == TaskKind::OneTime && task.executed {
                continue;
            }
            let key = task.trigger_key();
            expected.insert(key.to_string());

            if live.contains(&key.to_string()) {
                continue;
            }
            match task.definition() {
                Ok(definition) => {
                    self.arm(key, definition.trigger()).await?;
                    armed += 1;
                }
                Err(error) => {
                    tracing::warn!(task_id = task.id, error = %error, "skipping task with invalid schedule during reconcile");
                }
            }
        }

        let mut removed = 0usize;
        for orphan in live.difference(&expected) {
            self.queue.remove(orphan).await?;
            removed += 1;
        }

        tracing::info!(armed, removed, "store and queue reconciled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::queue::MemoryWorkQueue;
    use crate::repositories::testing::InMemoryTaskStore;
    use crate::scheduler::CronRule;

    struct Fixture {
        service: TaskService,
        store: Arc<InMemoryTaskStore>,
        queue: Arc<MemoryWorkQueue>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryTaskStore::new());
        let queue = Arc::new(MemoryWorkQueue::new());
        let service = TaskService::new(
            Arc::clone(&store) as Arc<dyn TaskStore>,
            Arc::clone(&queue) as Arc<dyn WorkQueue>,
        );
        Fixture {
            service,
            store,
            queue,
        }
    }

    fn one_time(minutes_from_now: i64) -> TaskDefinition {
        TaskDefinition::OneTime {
            scheduled_time: Utc::now() + Duration::minutes(minutes_from_now),
        }
    }

    fn recurring(expression: &str) -> TaskDefinition {
        TaskDefinition::Recurring {
            cron: expression.parse::<CronRule>().unwrap(),
        }
    }

    #[tokio::test]
    async fn create_one_time_arms_trigger_at_scheduled_time() {
        let f = fixture();
        let definition = one_time(10);
        let TaskDefinition::OneTime { scheduled_time } = definition.clone() else {
            unreachable!()
        };

        let task = f.service.create(definition).await.unwrap();

        let key = format!("one-time-{}", task.id);
        assert_eq!(f.queue.live_keys().await.unwrap(), vec![key.clone()]);
        // Delay is exactly scheduled_time - now, i.e. about ten minutes.
        assert_eq!(f.queue.entry_fire_at(&key).await, Some(scheduled_time));
        assert!(task.scheduled_time.is_some());
        assert!(!task.executed);
    }

    #[tokio::test]
    async fn create_recurring_arms_repeating_trigger_with_pattern() {
        let f = fixture();
        let task = f.service.create(recurring("30 17 * * *")).await.unwrap();

        let key = format!("recurring-{}", task.id);
        assert_eq!(
            f.queue.entry_cron(&key).await.as_deref(),
            Some("30 17 * * *")
        );
        assert_eq!(task.cron.as_deref(), Some("30 17 * * *"));
        assert_eq!(task.scheduled_time, None);
    }

    #[tokio::test]
    async fn past_scheduled_time_is_armed_unclamped() {
        // Negative delay passes through; the entry is due on the next poll.
        let f = fixture();
        let task = f.service.create(one_time(-5)).await.unwrap();

        let key = format!("one-time-{}", task.id);
        let fire_at = f.queue.entry_fire_at(&key).await.unwrap();
        assert!(fire_at < Utc::now());

        let due = f.queue.poll_due(Utc::now(), 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].message.task_id, task.id);
    }

    #[tokio::test]
    async fn update_swaps_key_prefix_when_kind_changes() {
        let f = fixture();
        let task = f.service.create(one_time(10)).await.unwrap();
        assert_eq!(
            f.queue.live_keys().await.unwrap(),
            vec![format!("one-time-{}", task.id)]
        );

        let updated = f
            .service
            .update(task.id, recurring("0 9 * * 1"))
            .await
            .unwrap();

        assert_eq!(updated.id, task.id);
        assert_eq!(updated.kind, TaskKind::Recurring);
        assert_eq!(updated.cron.as_deref(), Some("0 9 * * 1"));
        assert_eq!(updated.scheduled_time, None);
        assert_eq!(
            f.queue.live_keys().await.unwrap(),
            vec![format!("recurring-{}", task.id)]
        );
    }

    #[tokio::test]
    async fn update_preserves_executed_flag() {
        let f = fixture();
        let task = f.service.create(one_time(-1)).await.unwrap();
        f.store.mark_executed(task.id).await.unwrap();

        let updated = f.service.update(task.id, one_time(10)).await.unwrap();
        assert!(updated.executed);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found_and_touches_nothing() {
        let f = fixture();
        f.service.create(one_time(10)).await.unwrap();
        let before = f.queue.live_keys().await.unwrap();

        let error = f.service.update(999, recurring("30 17 * * *")).await.unwrap_err();
        assert!(matches!(error, AppError::NotFound { .. }));
        assert_eq!(error.to_string(), "Task not found");
        assert_eq!(f.queue.live_keys().await.unwrap(), before);
    }

    #[tokio::test]
    async fn delete_removes_trigger_and_record() {
        let f = fixture();
        let task = f.service.create(one_time(10)).await.unwrap();

        f.service.delete(task.id).await.unwrap();

        assert_eq!(f.queue.len().await, 0);
        assert!(f.store.find_by_id(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found_and_touches_nothing() {
        let f = fixture();
        let task = f.service.create(recurring("30 17 * * *")).await.unwrap();

        let error = f.service.delete(999).await.unwrap_err();
        assert!(matches!(error, AppError::NotFound { .. }));
        assert_eq!(
            f.queue.live_keys().await.unwrap(),
            vec![format!("recurring-{}", task.id)]
        );
    }

    #[tokio::test]
    async fn list_returns_all_tasks() {
        let f = fixture();
        f.service.create(one_time(10)).await.unwrap();
        f.service.create(recurring("30 17 * * *")).await.unwrap();

        let tasks = f.service.list().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].id < tasks[1].id);
    }

    #[tokio::test]
    async fn reconcile_re_arms_missing_entries() {
        let f = fixture();
        let task = f.service.create(recurring("30 17 * * *")).await.unwrap();
        let key = format!("recurring-{}", task.id);

        // Simulate a lost trigger (e.g. enqueue failed after the write).
        f.queue.remove(&key).await.unwrap();
        assert_eq!(f.queue.len().await, 0);

        f.service.reconcile().await.unwrap();
        assert_eq!(f.queue.live_keys().await.unwrap(), vec![key]);
    }

    #[tokio::test]
    async fn reconcile_skips_executed_one_time_tasks() {
        let f = fixture();
        let task = f.service.create(one_time(-1)).await.unwrap();
        let key = format!("one-time-{}", task.id);

        f.store.mark_executed(task.id).await.unwrap();
        f.queue.remove(&key).await.unwrap();

        f.service.reconcile().await.unwrap();
        assert_eq!(f.queue.len().await, 0);
    }

    #[tokio::test]
    async fn reconcile_drops_orphan_entries() {
        let f = fixture();
        f.queue
            .enqueue_once(
                "one-time-42",
                TaskMessage { task_id: 42 },
                Utc::now() + Duration::minutes(5),
            )
            .await
            .unwrap();

        f.service.reconcile().await.unwrap();
        assert_eq!(f.queue.len().await, 0);
    }
}
