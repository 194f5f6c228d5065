use chrono::{Local, NaiveDateTime};

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock. Reminders carry no timezone, so they are compared
/// against the host's local time.
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
