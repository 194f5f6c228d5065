use crate::{
    reminder::{ReminderFireTime, UserId},
    storage::NewReminder,
};

use super::{CommandDispatcher, HandlerResult};

/// Progress of a user through `/crear_evento`. Each variant carries the
/// answers collected so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingReminder {
    AwaitingDate,
    AwaitingTime { date: String },
    AwaitingReason { date: String, time: String },
}

pub(super) async fn create_reminder_start(
    dispatcher: &CommandDispatcher,
    user: &UserId,
) -> HandlerResult {
    dispatcher
        .dialogues
        .update_dialogue(user.clone(), PendingReminder::AwaitingDate)
        .await;

    dispatcher
        .reply(user, "📅 Dime la *fecha* del evento (DD/MM/AAAA):")
        .await;

    Ok(())
}

/// Any text, including `/crear_evento` itself, is taken as the answer to the
/// current step.
pub(super) async fn receive_step(
    dispatcher: &CommandDispatcher,
    user: &UserId,
    state: PendingReminder,
    text: &str,
) -> HandlerResult {
    match state {
        PendingReminder::AwaitingDate => receive_date(dispatcher, user, text).await,
        PendingReminder::AwaitingTime { date } => receive_time(dispatcher, user, date, text).await,
        PendingReminder::AwaitingReason { date, time } => {
            receive_reason(dispatcher, user, date, time, text).await
        }
    }
}

async fn receive_date(dispatcher: &CommandDispatcher, user: &UserId, text: &str) -> HandlerResult {
    dispatcher
        .dialogues
        .update_dialogue(
            user.clone(),
            PendingReminder::AwaitingTime {
                date: text.trim().to_string(),
            },
        )
        .await;

    dispatcher
        .reply(user, "📌 Ahora dime la *hora* (HH:MM)")
        .await;

    Ok(())
}

async fn receive_time(
    dispatcher: &CommandDispatcher,
    user: &UserId,
    date: String,
    text: &str,
) -> HandlerResult {
    dispatcher
        .dialogues
        .update_dialogue(
            user.clone(),
            PendingReminder::AwaitingReason {
                date,
                time: text.trim().to_string(),
            },
        )
        .await;

    dispatcher
        .reply(user, "📝 ¿Cuál es el *motivo* del recordatorio?")
        .await;

    Ok(())
}

async fn receive_reason(
    dispatcher: &CommandDispatcher,
    user: &UserId,
    date: String,
    time: String,
    text: &str,
) -> HandlerResult {
    // Success and failure both end the dialogue; a bad date restarts from scratch.
    dispatcher.dialogues.remove_dialogue(user).await;

    let fire_at = match ReminderFireTime::parse(&date, &time) {
        Ok(fire_at) => fire_at,
        Err(error) => {
            log::info!(
                "Discarding reminder with invalid date. [user = {}, date = {:?}, time = {:?}, error = {}]",
                user,
                date,
                time,
                error
            );
            dispatcher
                .reply(user, "❌ Formato incorrecto. Usa DD/MM/AAAA y HH:MM")
                .await;
            return Ok(());
        }
    };

    let message = text.trim().to_string();
    let reminder = dispatcher
        .reminders
        .insert(NewReminder {
            user: user.clone(),
            message: message.clone(),
            fire_at,
        })
        .await?;

    log::info!(
        "Created reminder. [reminder_id = {}, user = {}, fire_at = {}]",
        reminder.id,
        user,
        reminder.fire_at
    );

    let confirmation = format!(
        "✅ *Evento creado*\n📅 {date}\n⏰ {time}\n📝 {message}\n\nTe lo recordaré a esa hora."
    );
    dispatcher.reply(user, &confirmation).await;

    Ok(())
}
