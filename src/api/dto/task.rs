//! Task-related DTOs for API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::models::{Task, TaskDefinition, TaskKind};
use crate::scheduler::CronRule;

pub const CRON_REQUIRED_MESSAGE: &str = "Cron expression is required for recurring tasks";
pub const SCHEDULED_TIME_REQUIRED_MESSAGE: &str = "Scheduled time is required for one-time tasks";

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating a task.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_create_schedule_fields))]
#[schema(example = json!({
    "type": "recurring",
    "cron": "30 17 * * *"
}))]
pub struct CreateTaskRequest {
    #[serde(rename = "type")]
    #[schema(example = "recurring")]
    pub kind: TaskKind,

    #[validate(length(min = 1, max = 255, message = "Cron expression must be between 1 and 255 characters"))]
    #[schema(example = "30 17 * * *")]
    pub cron: Option<String>,

    pub scheduled_time: Option<DateTime<Utc>>,
}

/// Request body for updating a task. The schedule fields are replaced
/// wholesale; `executed` is untouched.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_update_schedule_fields))]
pub struct UpdateTaskRequest {
    #[serde(rename = "type")]
    pub kind: TaskKind,

    #[validate(length(min = 1, max = 255, message = "Cron expression must be between 1 and 255 characters"))]
    pub cron: Option<String>,

    pub scheduled_time: Option<DateTime<Utc>>,
}

fn validate_create_schedule_fields(req: &CreateTaskRequest) -> Result<(), ValidationError> {
    check_required_fields(req.kind, req.cron.as_deref(), req.scheduled_time.as_ref())
}

fn validate_update_schedule_fields(req: &UpdateTaskRequest) -> Result<(), ValidationError> {
    check_required_fields(req.kind, req.cron.as_deref(), req.scheduled_time.as_ref())
}

fn check_required_fields(
    kind: TaskKind,
    cron: Option<&str>,
    scheduled_time: Option<&DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match kind {
        TaskKind::Recurring if cron.is_none() => Err(required_error(CRON_REQUIRED_MESSAGE)),
        TaskKind::OneTime if scheduled_time.is_none() => {
            Err(required_error(SCHEDULED_TIME_REQUIRED_MESSAGE))
        }
        _ => Ok(()),
    }
}

fn required_error(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("required");
    error.message = Some(message.into());
    error
}

/// Builds a validated [`TaskDefinition`] from loose request parts.
///
/// Missing required fields surface the exact wire messages; an unparseable
/// cron expression becomes a 400 as well.
fn definition_from_parts(
    kind: TaskKind,
    cron: Option<String>,
    scheduled_time: Option<DateTime<Utc>>,
) -> AppResult<TaskDefinition> {
    match kind {
        TaskKind::OneTime => {
            let scheduled_time = scheduled_time.ok_or_else(|| AppError::Validation {
                message: SCHEDULED_TIME_REQUIRED_MESSAGE.to_string(),
            })?;
            Ok(TaskDefinition::OneTime { scheduled_time })
        }
        TaskKind::Recurring => {
            let expression = cron.ok_or_else(|| AppError::Validation {
                message: CRON_REQUIRED_MESSAGE.to_string(),
            })?;
            let cron = expression.parse::<CronRule>()?;
            Ok(TaskDefinition::Recurring { cron })
        }
    }
}

impl CreateTaskRequest {
    pub fn into_definition(self) -> AppResult<TaskDefinition> {
        definition_from_parts(self.kind, self.cron, self.scheduled_time)
    }
}

impl UpdateTaskRequest {
    pub fn into_definition(self) -> AppResult<TaskDefinition> {
        definition_from_parts(self.kind, self.cron, self.scheduled_time)
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response body for task data.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub cron: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub executed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            kind: task.kind,
            cron: task.cron,
            scheduled_time: task.scheduled_time,
            executed: task.executed,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn create_request_parses_camel_case_body() {
        let json = r#"{"type":"one-time","scheduledTime":"2026-08-07T12:00:00Z"}"#;
        let req: CreateTaskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.kind, TaskKind::OneTime);
        assert!(req.cron.is_none());
        assert!(req.scheduled_time.is_some());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn recurring_without_cron_fails_with_exact_message() {
        let json = r#"{"type":"recurring"}"#;
        let req: CreateTaskRequest = serde_json::from_str(json).unwrap();

        let errors = req.validate().unwrap_err();
        let rendered = format!("{:?}", errors);
        assert!(rendered.contains(CRON_REQUIRED_MESSAGE));

        let error = req.into_definition().unwrap_err();
        assert_eq!(error.to_string(), CRON_REQUIRED_MESSAGE);
    }

    #[test]
    fn one_time_without_scheduled_time_fails_with_exact_message() {
        let json = r#"{"type":"one-time","cron":null,"scheduledTime":null}"#;
        let req: CreateTaskRequest = serde_json::from_str(json).unwrap();

        assert!(req.validate().is_err());
        let error = req.into_definition().unwrap_err();
        assert_eq!(error.to_string(), SCHEDULED_TIME_REQUIRED_MESSAGE);
    }

    #[test]
    fn malformed_cron_becomes_bad_request() {
        let json = r#"{"type":"recurring","cron":"not a cron"}"#;
        let req: CreateTaskRequest = serde_json::from_str(json).unwrap();

        // Field presence is fine; the value itself is rejected downstream.
        assert!(req.validate().is_ok());
        let error = req.into_definition().unwrap_err();
        match error {
            AppError::BadRequest { message } => {
                assert!(message.starts_with("Invalid cron expression:"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn definition_drops_the_irrelevant_field() {
        let json = r#"{"type":"one-time","cron":"30 17 * * *","scheduledTime":"2026-08-07T12:00:00Z"}"#;
        let req: CreateTaskRequest = serde_json::from_str(json).unwrap();
        match req.into_definition().unwrap() {
            TaskDefinition::OneTime { .. } => {}
            other => panic!("unexpected definition: {:?}", other),
        }
    }

    #[test]
    fn response_serializes_wire_shape() {
        let created = Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap();
        let response = TaskResponse {
            id: 17,
            kind: TaskKind::OneTime,
            cron: None,
            scheduled_time: Some(Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap()),
            executed: false,
            created_at: created,
            updated_at: created,
        };

        let value: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], 17);
        assert_eq!(value["type"], "one-time");
        assert_eq!(value["cron"], serde_json::Value::Null);
        assert!(value["scheduledTime"].is_string());
        assert_eq!(value["executed"], false);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        // Internal field names never leak.
        assert!(value.get("kind").is_none());
        assert!(value.get("scheduled_time").is_none());
    }
}
