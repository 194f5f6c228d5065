use std::sync::Arc;

use anyhow::Context;
use recordatorio::{
    appsettings::AppSettings,
    conversation::{CommandDispatcher, PendingReminder},
    delivery::{DeliveryChannel, WhatsAppDeliveryChannel},
    scheduling::{LocalClock, ReminderScheduler},
    storage::{InMemDialogueStorage, InMemoryReminderStorage, ReminderStorage},
    webhook::{self, WebhookState},
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let log_filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&log_filters)
        .init();

    let settings = AppSettings::load().context("Could not load application settings")?;
    log::info!("Starting recordatorio");

    let delivery: Arc<dyn DeliveryChannel> = Arc::new(
        WhatsAppDeliveryChannel::new(settings.whatsapp.clone())
            .context("Could not create WhatsApp delivery channel")?,
    );
    let reminders: Arc<dyn ReminderStorage> = Arc::new(InMemoryReminderStorage::new());
    let dialogues = Arc::new(InMemDialogueStorage::<PendingReminder>::new());

    // Runs for the life of the process.
    let _scheduler =
        ReminderScheduler::new(reminders.clone(), delivery.clone(), Arc::new(LocalClock))
            .with_delivery_timeout(settings.whatsapp.request_timeout())
            .spawn(settings.scheduler.scan_interval(), CancellationToken::new());

    let dispatcher = CommandDispatcher::new(delivery, dialogues, reminders);
    let state = WebhookState::new(dispatcher, settings.whatsapp.verify_token.clone());
    let app = webhook::router(Arc::new(state));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Could not bind {addr}"))?;
    log::info!("Webhook listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
