use std::{sync::Arc, time::Duration};

use tokio::{
    task::{self, JoinHandle, JoinSet},
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    delivery::{DeliveryChannel, DeliveryError},
    reminder::{ReminderFireTime, ScheduledReminder},
    storage::ReminderStorage,
};

use super::Clock;

const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Periodically scans the reminder store and fires every reminder whose
/// minute has come. Delivery is fire-and-forget: a fired reminder is removed
/// whatever the outcome of the send.
pub struct ReminderScheduler {
    reminders: Arc<dyn ReminderStorage>,
    delivery: Arc<dyn DeliveryChannel>,
    clock: Arc<dyn Clock>,
    delivery_timeout: Duration,
}

impl ReminderScheduler {
    pub fn new(
        reminders: Arc<dyn ReminderStorage>,
        delivery: Arc<dyn DeliveryChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reminders,
            delivery,
            clock,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    pub fn with_delivery_timeout(mut self, delivery_timeout: Duration) -> Self {
        self.delivery_timeout = delivery_timeout;
        self
    }

    pub fn spawn(
        self,
        scan_interval: Duration,
        cancellation_token: CancellationToken,
    ) -> JoinHandle<()> {
        let scheduler = Arc::new(self);
        task::spawn(async move { scheduler.run(scan_interval, cancellation_token).await })
    }

    async fn run(self: Arc<Self>, scan_interval: Duration, cancellation_token: CancellationToken) {
        log::info!("Starting reminder scheduler. [scan_interval = {:?}]", scan_interval);

        let mut ticker = time::interval(scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    log::info!("Reminder scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    // A panicking scan only loses its own pass.
                    let scheduler = Arc::clone(&self);
                    let scan = task::spawn(async move { scheduler.scan_due_reminders().await });
                    if let Err(error) = scan.await {
                        log::error!("Reminder scan failed. [error = {}]", error);
                    }
                }
            }
        }
    }

    /// Fires every reminder due at the current minute and returns how many
    /// were fired. Due reminders are sent concurrently so a pass never takes
    /// longer than one delivery timeout.
    pub async fn scan_due_reminders(&self) -> usize {
        let now = ReminderFireTime::new(self.clock.now());
        let due: Vec<ScheduledReminder> = self
            .reminders
            .get_all()
            .await
            .into_iter()
            .filter(|reminder| reminder.fire_at == now)
            .collect();

        let mut deliveries = JoinSet::new();
        for reminder in &due {
            deliveries.spawn(fire(
                Arc::clone(&self.delivery),
                self.delivery_timeout,
                reminder.clone(),
            ));
        }
        while let Some(result) = deliveries.join_next().await {
            if let Err(error) = result {
                log::error!("Reminder delivery task failed. [error = {}]", error);
            }
        }

        for reminder in &due {
            self.reminders.remove(reminder.id).await;
        }

        if !due.is_empty() {
            log::info!("Fired {} reminder(s) for {}", due.len(), now);
        }
        due.len()
    }
}

async fn fire(
    delivery: Arc<dyn DeliveryChannel>,
    delivery_timeout: Duration,
    reminder: ScheduledReminder,
) {
    let text = reminder.notification_text();
    let send = delivery.send_message(&reminder.user, &text);
    let result = time::timeout(delivery_timeout, send)
        .await
        .unwrap_or(Err(DeliveryError::Timeout));

    match result {
        Ok(()) => log::info!(
            "Delivered reminder. [reminder_id = {}, user = {}]",
            reminder.id,
            reminder.user
        ),
        Err(error) => log::warn!(
            "Reminder delivery failed, dropping it. [reminder_id = {}, user = {}, error = {}]",
            reminder.id,
            reminder.user,
            error
        ),
    }
}
