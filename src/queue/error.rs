use thiserror::Error;

use crate::scheduler::ScheduleError;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue connection error: {0}")]
    Connection(String),

    #[error("Queue operation failed: {0}")]
    Operation(String),

    #[error("Queue entry serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
