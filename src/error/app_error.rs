use thiserror::Error;

use crate::queue::QueueError;
use crate::scheduler::ScheduleError;

/// Application-wide error type that represents all possible errors in the
/// system.
///
/// Variants carry structured context; the HTTP mapping lives in
/// `api::middleware::error_handler`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error with entity information
    #[error("{entity} not found")]
    NotFound { entity: String },

    /// Validation error with a caller-facing message
    #[error("{message}")]
    Validation { message: String },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Database operation error with operation context
    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Scheduled work queue error
    #[error("Queue operation failed")]
    Queue {
        #[source]
        source: QueueError,
    },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Connection pool error
    #[error("Connection pool error")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for the task-not-found case used across the lifecycle
    /// operations.
    pub fn task_not_found() -> Self {
        AppError::NotFound {
            entity: "Task".to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
            },
            other => AppError::Database {
                operation: "database operation".to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }
}

impl From<QueueError> for AppError {
    fn from(error: QueueError) -> Self {
        AppError::Queue { source: error }
    }
}

impl From<ScheduleError> for AppError {
    fn from(error: ScheduleError) -> Self {
        AppError::BadRequest {
            message: format!("Invalid cron expression: {}", error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_not_found_renders_wire_message() {
        let error = AppError::task_not_found();
        assert_eq!(error.to_string(), "Task not found");
    }

    #[test]
    fn diesel_not_found_maps_to_not_found() {
        let error = AppError::from(diesel::result::Error::NotFound);
        assert!(matches!(error, AppError::NotFound { .. }));
    }

    #[test]
    fn schedule_error_maps_to_bad_request() {
        let source = ScheduleError::Malformed {
            expression: "bad".to_string(),
            reason: "expected 5 fields, got 1".to_string(),
        };
        let error = AppError::from(source);
        match error {
            AppError::BadRequest { message } => {
                assert!(message.starts_with("Invalid cron expression:"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
