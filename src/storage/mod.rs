mod dialogue_storage;
mod model;
mod reminder_storage;

pub use dialogue_storage::{DialogueStorage, InMemDialogueStorage};
pub use model::NewReminder;
pub use reminder_storage::{InMemoryReminderStorage, ReminderStorage};
