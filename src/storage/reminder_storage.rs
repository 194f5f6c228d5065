use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::reminder::{ReminderId, ScheduledReminder};

use super::NewReminder;

#[async_trait]
pub trait ReminderStorage: Send + Sync {
    async fn insert(&self, reminder: NewReminder) -> anyhow::Result<ScheduledReminder>;
    async fn get(&self, id: ReminderId) -> Option<ScheduledReminder>;
    /// Snapshot of every pending reminder in insertion order.
    async fn get_all(&self) -> Vec<ScheduledReminder>;
    async fn remove(&self, id: ReminderId) -> Option<ScheduledReminder>;
}

struct InMemoryReminderStore {
    current_id: ReminderId,
    reminders: Vec<ScheduledReminder>,
}

pub struct InMemoryReminderStorage {
    store: RwLock<InMemoryReminderStore>,
}

impl InMemoryReminderStorage {
    pub fn new() -> Self {
        InMemoryReminderStorage {
            store: RwLock::new(InMemoryReminderStore {
                current_id: 0,
                reminders: Vec::new(),
            }),
        }
    }
}

impl Default for InMemoryReminderStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReminderStorage for InMemoryReminderStorage {
    async fn insert(&self, reminder: NewReminder) -> anyhow::Result<ScheduledReminder> {
        let mut store = self.store.write().await;
        let id = store.current_id;
        let scheduled = ScheduledReminder {
            id,
            user: reminder.user,
            message: reminder.message,
            fire_at: reminder.fire_at,
        };

        store.reminders.push(scheduled.clone());
        store.current_id += 1;

        log::info!(
            "Stored reminder. [reminder_id = {}, fire_at = {}]",
            id,
            scheduled.fire_at
        );
        Ok(scheduled)
    }

    async fn get(&self, id: ReminderId) -> Option<ScheduledReminder> {
        let store = self.store.read().await;
        store.reminders.iter().find(|r| r.id == id).cloned()
    }

    async fn get_all(&self) -> Vec<ScheduledReminder> {
        let store = self.store.read().await;
        store.reminders.clone()
    }

    async fn remove(&self, id: ReminderId) -> Option<ScheduledReminder> {
        let mut store = self.store.write().await;
        let position = store.reminders.iter().position(|r| r.id == id)?;
        Some(store.reminders.remove(position))
    }
}
