use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::queue::QueueError;
use crate::scheduler::{CronRule, TaskMessage};

/// A due entry claimed from the queue, awaiting acknowledgement.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub key: String,
    pub message: TaskMessage,
}

/// Durable, key-addressed store of pending fire events.
///
/// Keys are unique; callers replacing a trigger must `remove` before
/// enqueueing again. Per-key delivery order is preserved, nothing is
/// guaranteed across keys.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Schedules a single delivery of `message` at `fire_at`. A `fire_at`
    /// in the past is not clamped; the entry is immediately due.
    async fn enqueue_once(
        &self,
        key: &str,
        message: TaskMessage,
        fire_at: DateTime<Utc>,
    ) -> Result<(), QueueError>;

    /// Schedules recurring delivery according to `rule`. After each
    /// completed delivery the queue re-arms for the next occurrence,
    /// indefinitely, until removed.
    async fn enqueue_repeating(
        &self,
        key: &str,
        message: TaskMessage,
        rule: CronRule,
    ) -> Result<(), QueueError>;

    /// Cancels all future deliveries for `key`. Removing a nonexistent key
    /// is a no-op.
    async fn remove(&self, key: &str) -> Result<(), QueueError>;

    /// Claims up to `limit` entries due at `now`, placing each under a
    /// visibility lease. Unacknowledged claims become due again once the
    /// lease lapses.
    async fn poll_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Delivery>, QueueError>;

    /// Acknowledges a claimed delivery: drops a one-time entry, re-arms a
    /// recurring one. A no-op when the key was removed mid-flight.
    async fn complete(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// Lists the keys of all live entries.
    async fn live_keys(&self) -> Result<Vec<String>, QueueError>;
}
