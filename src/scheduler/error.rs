use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("malformed cron expression '{expression}': {reason}")]
    Malformed { expression: String, reason: String },

    #[error("no upcoming occurrence for cron expression '{0}'")]
    NoUpcomingOccurrence(String),
}

impl ScheduleError {
    pub fn malformed(expression: &str, reason: impl Into<String>) -> Self {
        ScheduleError::Malformed {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}
