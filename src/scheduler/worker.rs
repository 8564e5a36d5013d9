//! Execution worker pool consuming due entries from the work queue.
//!
//! Each worker loops: wait for the poll tick or shutdown, claim due entries,
//! execute the side effect, acknowledge. A delivery whose task no longer
//! exists is acknowledged as a no-op; that check, not locking, resolves the
//! race between `remove` and an in-flight delivery.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::settings::WorkerConfig;
use crate::error::AppResult;
use crate::queue::{Delivery, WorkQueue};
use crate::repositories::TaskStore;

/// A single queue consumer.
pub struct TaskWorker {
    queue: Arc<dyn WorkQueue>,
    store: Arc<dyn TaskStore>,
    batch_size: usize,
}

impl TaskWorker {
    pub fn new(queue: Arc<dyn WorkQueue>, store: Arc<dyn TaskStore>, batch_size: usize) -> Self {
        Self {
            queue,
            store,
            batch_size,
        }
    }

    async fn run(self, worker_id: usize, poll_interval: Duration, shutdown: CancellationToken) {
        tracing::debug!(worker_id, "execution worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!(worker_id, "execution worker stopping");
                    break;
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }

            if let Err(error) = self.drain_once(Utc::now()).await {
                tracing::error!(worker_id, error = %error, "polling the work queue failed");
            }
        }
    }

    /// Claims and processes one batch of due entries. Returns how many
    /// deliveries were handled.
    pub(crate) async fn drain_once(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let deliveries = self
            .queue
            .poll_due(now, self.batch_size)
            .await
            .map_err(crate::error::AppError::from)?;

        let handled = deliveries.len();
        for delivery in deliveries {
            self.handle_delivery(delivery).await;
        }
        Ok(handled)
    }

    async fn handle_delivery(&self, delivery: Delivery) {
        let task_id = delivery.message.task_id;

        let task = match self.store.find_by_id(task_id).await {
            Ok(task) => task,
            Err(error) => {
                // Leave the delivery unacknowledged; the lease lapses and
                // the queue redelivers.
                tracing::error!(task_id, key = %delivery.key, error = %error, "loading task failed");
                return;
            }
        };

        let Some(task) = task else {
            tracing::debug!(task_id, key = %delivery.key, "task deleted before execution, acknowledging");
            self.acknowledge(&delivery).await;
            return;
        };

        match self.store.mark_executed(task.id).await {
            Ok(()) => {
                tracing::info!(
                    task_id = task.id,
                    kind = %task.kind,
                    executed_at = %Utc::now(),
                    "task executed"
                );
                self.acknowledge(&delivery).await;
            }
            Err(error) => {
                tracing::error!(task_id, key = %delivery.key, error = %error, "task execution failed, leaving for redelivery");
            }
        }
    }

    async fn acknowledge(&self, delivery: &Delivery) {
        if let Err(error) = self.queue.complete(delivery).await {
            tracing::error!(key = %delivery.key, error = %error, "acknowledging delivery failed");
        }
    }
}

/// A pool of [`TaskWorker`]s sharing one shutdown token.
pub struct WorkerPool {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start(
        queue: Arc<dyn WorkQueue>,
        store: Arc<dyn TaskStore>,
        config: &WorkerConfig,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let poll_interval = Duration::from_millis(config.poll_interval_ms);

        let handles = (0..config.concurrency)
            .map(|worker_id| {
                let worker =
                    TaskWorker::new(Arc::clone(&queue), Arc::clone(&store), config.batch_size);
                let token = shutdown.clone();
                tokio::spawn(worker.run(worker_id, poll_interval, token))
            })
            .collect();

        tracing::info!(
            concurrency = config.concurrency,
            poll_interval_ms = config.poll_interval_ms,
            "worker pool started"
        );

        Self { shutdown, handles }
    }

    /// Signals every worker and waits for the loops to drain.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        futures::future::join_all(self.handles).await;
        tracing::info!("worker pool stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    use crate::models::{NewTask, TaskKind};
    use crate::queue::MemoryWorkQueue;
    use crate::repositories::testing::InMemoryTaskStore;
    use crate::scheduler::{CronRule, TaskMessage};

    fn worker(
        queue: &Arc<MemoryWorkQueue>,
        store: &Arc<InMemoryTaskStore>,
    ) -> TaskWorker {
        TaskWorker::new(
            Arc::clone(queue) as Arc<dyn WorkQueue>,
            Arc::clone(store) as Arc<dyn TaskStore>,
            16,
        )
    }

    fn one_time_task(scheduled_time: chrono::DateTime<Utc>) -> NewTask {
        NewTask {
            kind: TaskKind::OneTime,
            cron: None,
            scheduled_time: Some(scheduled_time),
        }
    }

    #[tokio::test]
    async fn executes_due_task_and_acknowledges() {
        let queue = Arc::new(MemoryWorkQueue::new());
        let store = Arc::new(InMemoryTaskStore::new());

        let past = Utc::now() - ChronoDuration::minutes(1);
        let task = store.create(one_time_task(past)).await.unwrap();
        queue
            .enqueue_once(
                &format!("one-time-{}", task.id),
                TaskMessage { task_id: task.id },
                past,
            )
            .await
            .unwrap();

        let handled = worker(&queue, &store).drain_once(Utc::now()).await.unwrap();

        assert_eq!(handled, 1);
        let task = store.find_by_id(task.id).await.unwrap().unwrap();
        assert!(task.executed);
        assert_eq!(queue.len().await, 0);
    }

    #[tokio::test]
    async fn missing_task_completes_as_no_op() {
        let queue = Arc::new(MemoryWorkQueue::new());
        let store = Arc::new(InMemoryTaskStore::new());

        queue
            .enqueue_once(
                "one-time-999",
                TaskMessage { task_id: 999 },
                Utc::now() - ChronoDuration::minutes(1),
            )
            .await
            .unwrap();

        let handled = worker(&queue, &store).drain_once(Utc::now()).await.unwrap();

        assert_eq!(handled, 1);
        assert_eq!(queue.len().await, 0);
    }

    #[tokio::test]
    async fn redelivery_of_executed_task_is_idempotent() {
        let queue = Arc::new(MemoryWorkQueue::new());
        let store = Arc::new(InMemoryTaskStore::new());

        let past = Utc::now() - ChronoDuration::minutes(1);
        let task = store.create(one_time_task(past)).await.unwrap();
        store.mark_executed(task.id).await.unwrap();

        let key = format!("one-time-{}", task.id);
        let message = TaskMessage { task_id: task.id };
        queue.enqueue_once(&key, message, past).await.unwrap();

        let w = worker(&queue, &store);
        // Deliver the same due entry twice, as an at-least-once queue may.
        w.drain_once(Utc::now()).await.unwrap();
        queue.enqueue_once(&key, message, past).await.unwrap();
        w.drain_once(Utc::now() + ChronoDuration::seconds(1)).await.unwrap();

        let task = store.find_by_id(task.id).await.unwrap().unwrap();
        assert!(task.executed);
    }

    #[tokio::test]
    async fn recurring_delivery_is_re_armed_by_the_queue() {
        let queue = Arc::new(MemoryWorkQueue::new());
        let store = Arc::new(InMemoryTaskStore::new());

        let rule: CronRule = "* * * * *".parse().unwrap();
        let task = store
            .create(NewTask {
                kind: TaskKind::Recurring,
                cron: Some(rule.to_string()),
                scheduled_time: None,
            })
            .await
            .unwrap();

        let key = format!("recurring-{}", task.id);
        queue
            .enqueue_repeating(&key, TaskMessage { task_id: task.id }, rule)
            .await
            .unwrap();

        let due_at = Utc::now() + ChronoDuration::minutes(2);
        let handled = worker(&queue, &store).drain_once(due_at).await.unwrap();

        assert_eq!(handled, 1);
        let task = store.find_by_id(task.id).await.unwrap().unwrap();
        assert!(task.executed);
        // The entry survives with a future fire time.
        assert!(queue.entry_fire_at(&key).await.unwrap() > Utc::now());
    }
}
