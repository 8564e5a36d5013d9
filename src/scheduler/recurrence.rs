//! Mapping between user-facing recurrence choices and their cron encoding.
//!
//! The cron expression is the canonical persisted form; the frequency choice
//! is recovered from it by inspecting which fields are pinned. A rule with
//! both dayOfMonth and dayOfWeek pinned is never produced here, but decoding
//! one resolves to monthly (dayOfMonth wins).

use std::fmt;

use crate::scheduler::cron::{CronField, CronRule};

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// A recurrence choice: daily, weekly on a weekday (0 = Sunday), or monthly
/// on a day of the month, always at a fixed time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Daily { hour: u32, minute: u32 },
    Weekly { weekday: u32, hour: u32, minute: u32 },
    Monthly { day: u32, hour: u32, minute: u32 },
}

impl Recurrence {
    /// Encodes the recurrence as a cron rule.
    ///
    /// Daily becomes `"M H * * *"`, weekly `"M H * * w"`, monthly
    /// `"M H d * *"`.
    pub fn to_rule(&self) -> CronRule {
        let (minute, hour) = match self {
            Recurrence::Daily { hour, minute }
            | Recurrence::Weekly { hour, minute, .. }
            | Recurrence::Monthly { hour, minute, .. } => (*minute, *hour),
        };

        CronRule {
            minute: CronField::Value(minute),
            hour: CronField::Value(hour),
            day_of_month: match self {
                Recurrence::Monthly { day, .. } => CronField::Value(*day),
                _ => CronField::Any,
            },
            month: CronField::Any,
            day_of_week: match self {
                Recurrence::Weekly { weekday, .. } => CronField::Value(*weekday),
                _ => CronField::Any,
            },
        }
    }

    /// Recovers the recurrence choice from a cron rule.
    ///
    /// Returns `None` when minute or hour is a wildcard; such rules are not
    /// produced by this system.
    pub fn from_rule(rule: &CronRule) -> Option<Recurrence> {
        let minute = rule.minute.value()?;
        let hour = rule.hour.value()?;

        if let Some(day) = rule.day_of_month.value() {
            return Some(Recurrence::Monthly { day, hour, minute });
        }
        if let Some(weekday) = rule.day_of_week.value() {
            return Some(Recurrence::Weekly {
                weekday,
                hour,
                minute,
            });
        }
        Some(Recurrence::Daily { hour, minute })
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Daily { hour, minute } => {
                write!(f, "daily at {:02}:{:02}", hour, minute)
            }
            Recurrence::Weekly {
                weekday,
                hour,
                minute,
            } => {
                let name = WEEKDAY_NAMES
                    .get(*weekday as usize)
                    .copied()
                    .unwrap_or("unknown");
                write!(f, "weekly on {} at {:02}:{:02}", name, hour, minute)
            }
            Recurrence::Monthly { day, hour, minute } => {
                write!(f, "monthly on day {} at {:02}:{:02}", day, hour, minute)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn daily_encodes_minute_hour_and_wildcards() {
        let rule = Recurrence::Daily {
            hour: 17,
            minute: 30,
        }
        .to_rule();
        assert_eq!(rule.to_string(), "30 17 * * *");
    }

    #[test]
    fn weekly_encodes_weekday_field() {
        let rule = Recurrence::Weekly {
            weekday: 3,
            hour: 9,
            minute: 0,
        }
        .to_rule();
        assert_eq!(rule.to_string(), "0 9 * * 3");
    }

    #[test]
    fn monthly_encodes_day_of_month_field() {
        let rule = Recurrence::Monthly {
            day: 15,
            hour: 6,
            minute: 45,
        }
        .to_rule();
        assert_eq!(rule.to_string(), "45 6 15 * *");
    }

    #[test]
    fn decoding_prefers_day_of_month_over_weekday() {
        let rule: CronRule = "30 17 15 * 3".parse().unwrap();
        assert_eq!(
            Recurrence::from_rule(&rule),
            Some(Recurrence::Monthly {
                day: 15,
                hour: 17,
                minute: 30,
            })
        );
    }

    #[test]
    fn decoding_wildcard_time_yields_none() {
        let rule: CronRule = "* 17 * * *".parse().unwrap();
        assert_eq!(Recurrence::from_rule(&rule), None);

        let rule: CronRule = "30 * * * *".parse().unwrap();
        assert_eq!(Recurrence::from_rule(&rule), None);
    }

    #[test]
    fn display_names_the_weekday() {
        let recurrence = Recurrence::Weekly {
            weekday: 0,
            hour: 8,
            minute: 5,
        };
        assert_eq!(recurrence.to_string(), "weekly on Sunday at 08:05");
    }

    proptest! {
        #[test]
        fn daily_round_trips(hour in 0u32..24, minute in 0u32..60) {
            let recurrence = Recurrence::Daily { hour, minute };
            let rule: CronRule = recurrence.to_rule().to_string().parse().unwrap();
            prop_assert_eq!(Recurrence::from_rule(&rule), Some(recurrence));
        }

        #[test]
        fn weekly_round_trips(weekday in 0u32..7, hour in 0u32..24, minute in 0u32..60) {
            let recurrence = Recurrence::Weekly { weekday, hour, minute };
            let rule: CronRule = recurrence.to_rule().to_string().parse().unwrap();
            prop_assert_eq!(Recurrence::from_rule(&rule), Some(recurrence));
        }

        #[test]
        fn monthly_round_trips(day in 1u32..32, hour in 0u32..24, minute in 0u32..60) {
            let recurrence = Recurrence::Monthly { day, hour, minute };
            let rule: CronRule = recurrence.to_rule().to_string().parse().unwrap();
            prop_assert_eq!(Recurrence::from_rule(&rule), Some(recurrence));
        }
    }
}
