use crate::reminder::{ReminderFireTime, UserId};

pub struct NewReminder {
    pub user: UserId,
    pub message: String,
    pub fire_at: ReminderFireTime,
}
