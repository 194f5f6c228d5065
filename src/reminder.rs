use std::fmt;

use chrono::{NaiveDateTime, ParseResult, Timelike};

pub type ReminderId = u64;
pub type UserId = String;

/// Format shared by user input (`date + " " + time`) and the scheduler clock.
pub const FIRE_AT_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Local wall-clock minute a reminder fires at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReminderFireTime(NaiveDateTime);

impl ReminderFireTime {
    pub fn new(inner: NaiveDateTime) -> Self {
        let normalized = inner
            .with_nanosecond(0)
            .and_then(|dt| dt.with_second(0))
            .expect("Zero seconds and nanoseconds are always valid.");
        Self(normalized)
    }

    pub fn parse(date: &str, time: &str) -> ParseResult<Self> {
        let combined = format!("{date} {time}");
        NaiveDateTime::parse_from_str(&combined, FIRE_AT_FORMAT).map(Self::new)
    }

    pub fn datetime(&self) -> &NaiveDateTime {
        &self.0
    }
}

impl fmt::Display for ReminderFireTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FIRE_AT_FORMAT))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReminder {
    pub id: ReminderId,
    pub user: UserId,
    pub message: String,
    pub fire_at: ReminderFireTime,
}

impl ScheduledReminder {
    pub fn notification_text(&self) -> String {
        format!("⏰ *Recordatorio:* {}", self.message)
    }
}
