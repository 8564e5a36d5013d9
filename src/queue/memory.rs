//! In-memory work queue with the same claim/lease semantics as the Redis
//! backend. Used by tests and local development; state dies with the
//! process.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::queue::traits::{Delivery, WorkQueue};
use crate::queue::QueueError;
use crate::scheduler::{CronRule, ScheduleError, TaskMessage};

const DEFAULT_LEASE_SECONDS: i64 = 30;

#[derive(Debug, Clone)]
struct MemoryEntry {
    message: TaskMessage,
    cron: Option<CronRule>,
    fire_at: DateTime<Utc>,
}

/// In-memory [`WorkQueue`].
pub struct MemoryWorkQueue {
    entries: Mutex<HashMap<String, MemoryEntry>>,
    lease: Duration,
}

impl MemoryWorkQueue {
    pub fn new() -> Self {
        Self::with_lease(Duration::seconds(DEFAULT_LEASE_SECONDS))
    }

    pub fn with_lease(lease: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            lease,
        }
    }
}

impl Default for MemoryWorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkQueue for MemoryWorkQueue {
    async fn enqueue_once(
        &self,
        key: &str,
        message: TaskMessage,
        fire_at: DateTime<Utc>,
    ) -> Result<(), QueueError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                message,
                cron: None,
                fire_at,
            },
        );
        Ok(())
    }

    async fn enqueue_repeating(
        &self,
        key: &str,
        message: TaskMessage,
        rule: CronRule,
    ) -> Result<(), QueueError> {
        let first = rule
            .next_occurrence(Utc::now())
            .ok_or_else(|| ScheduleError::NoUpcomingOccurrence(rule.to_string()))?;
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                message,
                cron: Some(rule),
                fire_at: first,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), QueueError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }

    async fn poll_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Delivery>, QueueError> {
        let mut entries = self.entries.lock().await;

        let mut due: Vec<(String, DateTime<Utc>)> = entries
            .iter()
            .filter(|(_, entry)| entry.fire_at <= now)
            .map(|(key, entry)| (key.clone(), entry.fire_at))
            .collect();
        due.sort_by_key(|(_, fire_at)| *fire_at);
        due.truncate(limit);

        let mut deliveries = Vec::with_capacity(due.len());
        for (key, _) in due {
            if let Some(entry) = entries.get_mut(&key) {
                entry.fire_at = now + self.lease;
                deliveries.push(Delivery {
                    key,
                    message: entry.message,
                });
            }
        }

        Ok(deliveries)
    }

    async fn complete(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut entries = self.entries.lock().await;

        let Some(entry) = entries.get_mut(&delivery.key) else {
            // Removed while in flight; nothing to acknowledge.
            return Ok(());
        };

        match &entry.cron {
            Some(rule) => match rule.next_occurrence(Utc::now()) {
                Some(next) => {
                    entry.fire_at = next;
                    Ok(())
                }
                None => {
                    tracing::warn!(key = %delivery.key, "recurring entry has no upcoming occurrence, dropping");
                    entries.remove(&delivery.key);
                    Ok(())
                }
            },
            None => {
                entries.remove(&delivery.key);
                Ok(())
            }
        }
    }

    async fn live_keys(&self) -> Result<Vec<String>, QueueError> {
        let entries = self.entries.lock().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
impl MemoryWorkQueue {
    pub async fn entry_fire_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let entries = self.entries.lock().await;
        entries.get(key).map(|entry| entry.fire_at)
    }

    pub async fn entry_cron(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .and_then(|entry| entry.cron.as_ref().map(|rule| rule.to_string()))
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.len()
    }
}
