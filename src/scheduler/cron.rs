//! Five-field cron expression parsing and next-occurrence calculation.
//!
//! Handles the restricted subset this system produces: each field is either a
//! wildcard or a single numeric value. Field order is
//! `minute hour dayOfMonth month dayOfWeek`, with 0 = Sunday.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};

use crate::scheduler::error::ScheduleError;

/// Search window for the next occurrence. Four years covers every satisfiable
/// day-of-month/weekday combination, including leap days.
const SEARCH_WINDOW_DAYS: i64 = 4 * 366;

/// A single cron field: unconstrained or pinned to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronField {
    Any,
    Value(u32),
}

impl CronField {
    pub fn matches(&self, candidate: u32) -> bool {
        match self {
            CronField::Any => true,
            CronField::Value(value) => *value == candidate,
        }
    }

    pub fn value(&self) -> Option<u32> {
        match self {
            CronField::Any => None,
            CronField::Value(value) => Some(*value),
        }
    }

    fn parse(
        raw: &str,
        name: &str,
        min: u32,
        max: u32,
        expression: &str,
    ) -> Result<Self, ScheduleError> {
        if raw == "*" {
            return Ok(CronField::Any);
        }

        let value: u32 = raw.parse().map_err(|_| {
            ScheduleError::malformed(
                expression,
                format!("{} field '{}' is not a number or '*'", name, raw),
            )
        })?;

        if value < min || value > max {
            return Err(ScheduleError::malformed(
                expression,
                format!("{} field {} is out of range {}-{}", name, value, min, max),
            ));
        }

        Ok(CronField::Value(value))
    }
}

impl fmt::Display for CronField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CronField::Any => write!(f, "*"),
            CronField::Value(value) => write!(f, "{}", value),
        }
    }
}

/// A parsed five-field cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronRule {
    pub minute: CronField,
    pub hour: CronField,
    pub day_of_month: CronField,
    pub month: CronField,
    pub day_of_week: CronField,
}

impl CronRule {
    /// Returns the earliest minute-aligned instant strictly after `after`
    /// that satisfies every non-wildcard field, or `None` when the rule has
    /// no occurrence inside the search window (e.g. `0 0 31 2 *`).
    pub fn next_occurrence(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let truncated = after.with_second(0).and_then(|t| t.with_nanosecond(0))?;
        let mut cursor = truncated + Duration::minutes(1);
        let horizon = cursor + Duration::days(SEARCH_WINDOW_DAYS);

        while cursor < horizon {
            let date = cursor.date_naive();
            if !self.month.matches(date.month()) || !self.day_matches(date) {
                cursor = next_midnight(date)?;
                continue;
            }
            if !self.hour.matches(cursor.hour()) {
                cursor = cursor.with_minute(0)? + Duration::hours(1);
                continue;
            }
            if !self.minute.matches(cursor.minute()) {
                cursor = cursor + Duration::minutes(1);
                continue;
            }
            return Some(cursor);
        }

        None
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        self.day_of_month.matches(date.day())
            && self.day_of_week.matches(date.weekday().num_days_from_sunday())
    }
}

fn next_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.succ_opt()?
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
}

impl FromStr for CronRule {
    type Err = ScheduleError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ScheduleError::malformed(
                expression,
                format!("expected 5 fields, got {}", fields.len()),
            ));
        }

        Ok(CronRule {
            minute: CronField::parse(fields[0], "minute", 0, 59, expression)?,
            hour: CronField::parse(fields[1], "hour", 0, 23, expression)?,
            day_of_month: CronField::parse(fields[2], "dayOfMonth", 1, 31, expression)?,
            month: CronField::parse(fields[3], "month", 1, 12, expression)?,
            day_of_week: CronField::parse(fields[4], "dayOfWeek", 0, 6, expression)?,
        })
    }
}

impl fmt::Display for CronRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}
