pub mod cron;
pub mod error;
pub mod recurrence;
pub mod types;
pub mod worker;

pub use cron::{CronField, CronRule};
pub use error::ScheduleError;
pub use recurrence::Recurrence;
pub use types::{TaskMessage, Trigger, TriggerKey};
pub use worker::{TaskWorker, WorkerPool};
