use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TaskKind;
use crate::scheduler::cron::CronRule;

/// Stable queue key derived from a task's kind and id, e.g. `one-time-17`
/// or `recurring-3`. Guarantees at most one live entry per task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerKey {
    kind: TaskKind,
    task_id: i32,
}

impl TriggerKey {
    pub fn new(kind: TaskKind, task_id: i32) -> Self {
        Self { kind, task_id }
    }

    pub fn task_id(&self) -> i32 {
        self.task_id
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.task_id)
    }
}

/// Payload carried by every scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMessage {
    pub task_id: i32,
}

/// The queue-side representation of when a task should next run.
#[derive(Debug, Clone)]
pub enum Trigger {
    Once { fire_at: DateTime<Utc> },
    Repeating { rule: CronRule },
}
