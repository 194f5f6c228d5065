mod create_reminder;

use std::sync::Arc;

pub use create_reminder::PendingReminder;

use crate::{
    delivery::DeliveryChannel,
    reminder::UserId,
    storage::{DialogueStorage, ReminderStorage},
};

pub type HandlerResult = anyhow::Result<()>;
pub type ReminderDialogueStorage = Arc<dyn DialogueStorage<PendingReminder>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlobalCommand {
    Help,
    Welcome,
    Status,
    CreateReminder,
}

impl GlobalCommand {
    const ALL: [GlobalCommand; 4] = [
        GlobalCommand::Help,
        GlobalCommand::Welcome,
        GlobalCommand::Status,
        GlobalCommand::CreateReminder,
    ];

    fn parse(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|command| command.keyword() == normalized)
    }

    fn keyword(self) -> &'static str {
        match self {
            GlobalCommand::Help => "/help",
            GlobalCommand::Welcome => "/bienvenida",
            GlobalCommand::Status => "/status",
            GlobalCommand::CreateReminder => "/crear_evento",
        }
    }

    fn description(self) -> &'static str {
        match self {
            GlobalCommand::Help => "Mostrar comandos",
            GlobalCommand::Welcome => "Saludo",
            GlobalCommand::Status => "Estado del bot",
            GlobalCommand::CreateReminder => "Programar recordatorio automático",
        }
    }
}

fn help_menu() -> String {
    GlobalCommand::ALL
        .into_iter()
        .fold("📘 *Menú de Ayuda*\n\n".to_string(), |mut menu, command| {
            menu.push_str(&format!("{} - {}\n", command.keyword(), command.description()));
            menu
        })
}

/// Routes every inbound text message. An in-progress reminder dialogue always
/// takes precedence over the static commands.
#[derive(Clone)]
pub struct CommandDispatcher {
    delivery: Arc<dyn DeliveryChannel>,
    dialogues: ReminderDialogueStorage,
    reminders: Arc<dyn ReminderStorage>,
}

impl CommandDispatcher {
    pub fn new(
        delivery: Arc<dyn DeliveryChannel>,
        dialogues: ReminderDialogueStorage,
        reminders: Arc<dyn ReminderStorage>,
    ) -> Self {
        Self {
            delivery,
            dialogues,
            reminders,
        }
    }

    pub async fn handle_message(&self, user: &UserId, text: &str) -> HandlerResult {
        if let Some(state) = self.dialogues.get_dialogue(user).await {
            return create_reminder::receive_step(self, user, state, text).await;
        }

        match GlobalCommand::parse(text) {
            Some(GlobalCommand::CreateReminder) => {
                create_reminder::create_reminder_start(self, user).await
            }
            Some(GlobalCommand::Help) => {
                self.reply(user, &help_menu()).await;
                Ok(())
            }
            Some(GlobalCommand::Welcome) => {
                self.reply(user, "👋 ¡Bienvenido! Soy tu bot funcionando en Render.")
                    .await;
                Ok(())
            }
            Some(GlobalCommand::Status) => {
                self.reply(user, "🟢 Bot funcionando (Render online)").await;
                Ok(())
            }
            None => {
                let echo = format!("🤖 Escribiste: {text}\nUsa */help* para ver opciones.");
                self.reply(user, &echo).await;
                Ok(())
            }
        }
    }

    /// Delivery failures end here: the channel that would carry an error
    /// message is the one that failed.
    async fn reply(&self, user: &str, text: &str) {
        if let Err(error) = self.delivery.send_message(user, text).await {
            log::warn!("Could not deliver reply. [user = {}, error = {}]", user, error);
        }
    }
}
