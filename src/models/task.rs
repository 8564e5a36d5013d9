use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::scheduler::{CronRule, Trigger, TriggerKey};
use crate::schema::tasks;

/// Task kind, stored as the `task_kind` PostgreSQL enum.
///
/// The wire representation is kebab-case (`one-time` / `recurring`), which is
/// also the prefix of the derived queue key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::TaskKind")]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    OneTime,
    Recurring,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::OneTime => write!(f, "one-time"),
            TaskKind::Recurring => write!(f, "recurring"),
        }
    }
}

/// A persisted task row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Task {
    pub id: i32,
    pub kind: TaskKind,
    pub cron: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub executed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The queue key under which this task's trigger lives.
    pub fn trigger_key(&self) -> TriggerKey {
        TriggerKey::new(self.kind, self.id)
    }

    /// Rebuilds the validated definition from the stored row.
    ///
    /// Fails when the row violates the kind invariant (missing schedule
    /// field) or carries an unparseable cron expression; callers decide
    /// whether that is fatal or a skip-and-log situation.
    pub fn definition(&self) -> AppResult<TaskDefinition> {
        match self.kind {
            TaskKind::OneTime => {
                let scheduled_time = self.scheduled_time.ok_or_else(|| AppError::Internal {
                    source: anyhow::anyhow!("one-time task {} has no scheduled time", self.id),
                })?;
                Ok(TaskDefinition::OneTime { scheduled_time })
            }
            TaskKind::Recurring => {
                let expression = self.cron.as_deref().ok_or_else(|| AppError::Internal {
                    source: anyhow::anyhow!("recurring task {} has no cron expression", self.id),
                })?;
                let cron = expression.parse::<CronRule>()?;
                Ok(TaskDefinition::Recurring { cron })
            }
        }
    }
}

/// Insertable form of a task.
#[derive(Debug, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    pub kind: TaskKind,
    pub cron: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
}

/// Wholesale update of a task's schedule fields.
///
/// `treat_none_as_null` makes the unused schedule field NULL when the kind
/// changes; `executed` is deliberately untouched by updates.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    pub kind: TaskKind,
    pub cron: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
}

/// A validated task definition: exactly one schedule representation,
/// enforced by the type instead of a pair of nullable columns.
#[derive(Debug, Clone)]
pub enum TaskDefinition {
    OneTime { scheduled_time: DateTime<Utc> },
    Recurring { cron: CronRule },
}

impl TaskDefinition {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskDefinition::OneTime { .. } => TaskKind::OneTime,
            TaskDefinition::Recurring { .. } => TaskKind::Recurring,
        }
    }

    /// Derives the queue-side trigger for this definition.
    pub fn trigger(&self) -> Trigger {
        match self {
            TaskDefinition::OneTime { scheduled_time } => Trigger::Once {
                fire_at: *scheduled_time,
            },
            TaskDefinition::Recurring { cron } => Trigger::Repeating { rule: cron.clone() },
        }
    }

    pub fn new_task(&self) -> NewTask {
        match self {
            TaskDefinition::OneTime { scheduled_time } => NewTask {
                kind: TaskKind::OneTime,
                cron: None,
                scheduled_time: Some(*scheduled_time),
            },
            TaskDefinition::Recurring { cron } => NewTask {
                kind: TaskKind::Recurring,
                cron: Some(cron.to_string()),
                scheduled_time: None,
            },
        }
    }

    pub fn changeset(&self) -> TaskChangeset {
        let new_task = self.new_task();
        TaskChangeset {
            kind: new_task.kind,
            cron: new_task.cron,
            scheduled_time: new_task.scheduled_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn one_time_row(scheduled_time: Option<DateTime<Utc>>) -> Task {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Task {
            id: 7,
            kind: TaskKind::OneTime,
            cron: None,
            scheduled_time,
            executed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TaskKind::OneTime).unwrap(),
            r#""one-time""#
        );
        assert_eq!(
            serde_json::to_string(&TaskKind::Recurring).unwrap(),
            r#""recurring""#
        );
    }

    #[test]
    fn definition_keeps_only_the_relevant_field() {
        let fire_at = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let new_task = TaskDefinition::OneTime {
            scheduled_time: fire_at,
        }
        .new_task();
        assert_eq!(new_task.kind, TaskKind::OneTime);
        assert_eq!(new_task.cron, None);
        assert_eq!(new_task.scheduled_time, Some(fire_at));

        let rule: CronRule = "30 17 * * *".parse().unwrap();
        let new_task = TaskDefinition::Recurring { cron: rule }.new_task();
        assert_eq!(new_task.kind, TaskKind::Recurring);
        assert_eq!(new_task.cron.as_deref(), Some("30 17 * * *"));
        assert_eq!(new_task.scheduled_time, None);
    }

    #[test]
    fn row_definition_round_trip() {
        let task = one_time_row(Some(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()));
        match task.definition().unwrap() {
            TaskDefinition::OneTime { scheduled_time } => {
                assert_eq!(scheduled_time, task.scheduled_time.unwrap());
            }
            other => panic!("unexpected definition: {:?}", other),
        }
    }

    #[test]
    fn invariant_violation_is_surfaced() {
        let task = one_time_row(None);
        assert!(task.definition().is_err());
    }
}
