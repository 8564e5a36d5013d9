//! Redis-backed work queue using a bb8 connection pool.
//!
//! Layout: one sorted set (`<prefix>:schedule:due`) scoring each key by its
//! next fire time in epoch milliseconds, plus one JSON entry record per key
//! (`<prefix>:schedule:entry:<key>`) holding the payload and, for recurring
//! entries, the cron expression. Claims bump the score by the lease via a
//! small Lua script so concurrent workers cannot claim the same entry twice.

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use chrono::{DateTime, Duration, Utc};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, Script};
use serde::{Deserialize, Serialize};

use crate::config::settings::QueueConfig;
use crate::queue::traits::{Delivery, WorkQueue};
use crate::queue::QueueError;
use crate::scheduler::{CronRule, ScheduleError, TaskMessage};

type RedisPool = Pool<Client>;

const CLAIM_SCRIPT: &str = r#"
local score = redis.call('ZSCORE', KEYS[1], ARGV[1])
if score and tonumber(score) <= tonumber(ARGV[2]) then
    redis.call('ZADD', KEYS[1], ARGV[3], ARGV[1])
    return 1
end
return 0
"#;

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    message: TaskMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    cron: Option<String>,
}

/// Redis-backed [`WorkQueue`].
pub struct RedisWorkQueue {
    pool: RedisPool,
    key_prefix: String,
    lease: Duration,
    claim_script: Script,
}

impl RedisWorkQueue {
    pub async fn new(config: &QueueConfig) -> Result<Self, QueueError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| QueueError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(std::time::Duration::from_secs(config.connection_timeout))
            .build(client)
            .await
            .map_err(|e| QueueError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            key_prefix: config.key_prefix.clone(),
            lease: Duration::seconds(config.lease_seconds as i64),
            claim_script: Script::new(CLAIM_SCRIPT),
        })
    }

    fn due_set(&self) -> String {
        format!("{}:schedule:due", self.key_prefix)
    }

    fn entry_key(&self, key: &str) -> String {
        format!("{}:schedule:entry:{}", self.key_prefix, key)
    }

    async fn get_conn(&self) -> Result<PooledConnection<'_, Client>, QueueError> {
        self.pool
            .get()
            .await
            .map_err(|e| QueueError::Connection(e.to_string()))
    }

    async fn store_entry(
        &self,
        key: &str,
        record: &EntryRecord,
        fire_at: DateTime<Utc>,
    ) -> Result<(), QueueError> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;

        conn_ref
            .set::<_, _, ()>(self.entry_key(key), json)
            .await
            .map_err(|e: RedisError| QueueError::Operation(e.to_string()))?;
        conn_ref
            .zadd::<_, _, _, ()>(self.due_set(), key, fire_at.timestamp_millis())
            .await
            .map_err(|e: RedisError| QueueError::Operation(e.to_string()))?;

        Ok(())
    }

    async fn load_entry(&self, key: &str) -> Result<Option<EntryRecord>, QueueError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;

        let json: Option<String> = conn_ref
            .get(self.entry_key(key))
            .await
            .map_err(|e: RedisError| QueueError::Operation(e.to_string()))?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn drop_entry(&self, key: &str) -> Result<(), QueueError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;

        conn_ref
            .zrem::<_, _, ()>(self.due_set(), key)
            .await
            .map_err(|e: RedisError| QueueError::Operation(e.to_string()))?;
        conn_ref
            .del::<_, ()>(self.entry_key(key))
            .await
            .map_err(|e: RedisError| QueueError::Operation(e.to_string()))?;

        Ok(())
    }

    /// Attempts to claim `key`; a second claimer loses because the first
    /// claim already moved the score past `now`.
    async fn try_claim(&self, key: &str, now: DateTime<Utc>) -> Result<bool, QueueError> {
        let lease_deadline = now + self.lease;
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;

        let claimed: i32 = self
            .claim_script
            .key(self.due_set())
            .arg(key)
            .arg(now.timestamp_millis())
            .arg(lease_deadline.timestamp_millis())
            .invoke_async(conn_ref)
            .await
            .map_err(|e: RedisError| QueueError::Operation(e.to_string()))?;

        Ok(claimed == 1)
    }
}

#[async_trait]
impl WorkQueue for RedisWorkQueue {
    async fn enqueue_once(
        &self,
        key: &str,
        message: TaskMessage,
        fire_at: DateTime<Utc>,
    ) -> Result<(), QueueError> {
        let record = EntryRecord {
            message,
            cron: None,
        };
        self.store_entry(key, &record, fire_at).await
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
        let record = EntryRecord {
            message,
            cron: Some(rule.to_string()),
        };
        self.store_entry(key, &record, first).await
    }

    async fn remove(&self, key: &str) -> Result<(), QueueError> {
        self.drop_entry(key).await
    }

    async fn poll_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Delivery>, QueueError> {
        let candidates: Vec<String> = {
            let mut conn = self.get_conn().await?;
            let conn_ref: &mut MultiplexedConnection = &mut conn;
            redis::cmd("ZRANGEBYSCORE")
                .arg(self.due_set())
                .arg("-inf")
                .arg(now.timestamp_millis())
                .arg("LIMIT")
                .arg(0)
                .arg(limit)
                .query_async(conn_ref)
                .await
                .map_err(|e: RedisError| QueueError::Operation(e.to_string()))?
        };

        let mut deliveries = Vec::with_capacity(candidates.len());
        for key in candidates {
            if !self.try_claim(&key, now).await? {
                continue;
            }
            match self.load_entry(&key).await? {
                Some(record) => deliveries.push(Delivery {
                    key,
                    message: record.message,
                }),
                None => {
                    // Entry record lost its member (raced a remove); clear
                    // the dangling sorted-set member.
                    self.drop_entry(&key).await?;
                }
            }
        }

        Ok(deliveries)
    }

    async fn complete(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let record = match self.load_entry(&delivery.key).await? {
            Some(record) => record,
            // Removed while in flight; nothing to acknowledge.
            None => return Ok(()),
        };

        let expression = match record.cron {
            Some(expression) => expression,
            None => return self.drop_entry(&delivery.key).await,
        };

        let rule: CronRule = match expression.parse() {
            Ok(rule) => rule,
            Err(error) => {
                tracing::error!(key = %delivery.key, error = %error, "dropping entry with unparseable cron");
                return self.drop_entry(&delivery.key).await;
            }
        };

        match rule.next_occurrence(Utc::now()) {
            Some(next) => {
                let mut conn = self.get_conn().await?;
                let conn_ref: &mut MultiplexedConnection = &mut conn;
                // XX: re-arm only while the member still exists, so a
                // concurrent remove wins.
                let _: () = redis::cmd("ZADD")
                    .arg(self.due_set())
                    .arg("XX")
                    .arg(next.timestamp_millis())
                    .arg(&delivery.key)
                    .query_async(conn_ref)
                    .await
                    .map_err(|e: RedisError| QueueError::Operation(e.to_string()))?;
                Ok(())
            }
            None => {
                tracing::warn!(key = %delivery.key, cron = %rule, "recurring entry has no upcoming occurrence, dropping");
                self.drop_entry(&delivery.key).await
            }
        }
    }

    async fn live_keys(&self) -> Result<Vec<String>, QueueError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;

        conn_ref
            .zrange(self.due_set(), 0, -1)
            .await
            .map_err(|e: RedisError| QueueError::Operation(e.to_string()))
    }
}
