mod clock;
mod scheduler;

pub use clock::{Clock, LocalClock};
pub use scheduler::ReminderScheduler;
