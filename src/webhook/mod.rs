//! HTTP surface of the bot: the Cloud API verification handshake and the
//! message notifications.

mod payload;

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tokio::task;

pub use payload::{InboundContent, InboundMessage, WebhookPayloadError, extract_message};

use crate::conversation::CommandDispatcher;

pub struct WebhookState {
    dispatcher: CommandDispatcher,
    verify_token: Option<String>,
}

impl WebhookState {
    pub fn new(dispatcher: CommandDispatcher, verify_token: Option<String>) -> Self {
        Self {
            dispatcher,
            verify_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .with_state(state)
}

async fn verify_webhook(
    State(state): State<Arc<WebhookState>>,
    Query(query): Query<VerifyQuery>,
) -> Result<String, (StatusCode, &'static str)> {
    let token_matches = match (&state.verify_token, &query.verify_token) {
        (Some(expected), Some(received)) => expected == received,
        _ => false,
    };

    if query.mode.as_deref() == Some("subscribe") && token_matches {
        log::info!("Webhook verification succeeded");
        Ok(query.challenge.unwrap_or_default())
    } else {
        log::warn!(
            "Webhook verification rejected. [mode = {:?}]",
            query.mode
        );
        Err((StatusCode::FORBIDDEN, "No autorizado"))
    }
}

/// Always answers 200 so the platform does not redeliver the notification.
async fn receive_webhook(State(state): State<Arc<WebhookState>>, body: Bytes) -> StatusCode {
    match extract_message(&body) {
        Ok(Some(message)) => handle_inbound(&state, message).await,
        Ok(None) => log::debug!("Webhook notification without messages"),
        Err(error) => log::warn!("Ignoring malformed webhook payload. [error = {}]", error),
    }

    StatusCode::OK
}

async fn handle_inbound(state: &WebhookState, message: InboundMessage) {
    let InboundMessage { from, content } = message;
    let text = match content {
        InboundContent::Text(text) => text,
        InboundContent::Other(kind) => {
            log::debug!("Skipping non-text message. [from = {}, type = {}]", from, kind);
            return;
        }
    };

    log::info!("Received message. [from = {}, length = {}]", from, text.len());

    let dispatcher = state.dispatcher.clone();
    let handler = task::spawn(async move { dispatcher.handle_message(&from, &text).await });

    match handler.await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => log::error!("Message handler failed. [error = {:#}]", error),
        Err(error) => log::error!("Message handler panicked. [error = {}]", error),
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::{
        conversation::PendingReminder,
        storage::{InMemDialogueStorage, InMemoryReminderStorage, ReminderStorage},
        test_utils::RecordingDeliveryChannel,
    };

    use super::*;

    struct TestContext {
        delivery: RecordingDeliveryChannel,
        reminders: Arc<InMemoryReminderStorage>,
        router: Router,
    }

    impl TestContext {
        fn new(verify_token: Option<&str>) -> Self {
            let delivery = RecordingDeliveryChannel::default();
            let reminders = Arc::new(InMemoryReminderStorage::new());
            let dialogues = Arc::new(InMemDialogueStorage::<PendingReminder>::new());
            let dispatcher =
                CommandDispatcher::new(Arc::new(delivery.clone()), dialogues, reminders.clone());
            let state = WebhookState::new(dispatcher, verify_token.map(str::to_string));

            Self {
                delivery,
                reminders,
                router: router(Arc::new(state)),
            }
        }

        async fn get(&self, uri: &str) -> (StatusCode, String) {
            let request = Request::get(uri).body(Body::empty()).unwrap();
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, String::from_utf8(body.to_vec()).unwrap())
        }

        async fn post(&self, body: impl Into<Body>) -> StatusCode {
            let request = Request::post("/webhook")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap();
            self.router.clone().oneshot(request).await.unwrap().status()
        }

        async fn post_text(&self, from: &str, text: &str) -> StatusCode {
            self.post(text_notification(from, text)).await
        }
    }

    fn text_notification(from: &str, text: &str) -> String {
        json!({
            "object": "whatsapp_business_account",
            "entry": [{ "changes": [{ "value": {
                "messaging_product": "whatsapp",
                "messages": [{ "from": from, "id": "wamid.x", "type": "text", "text": { "body": text } }]
            } }] }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn verification_echoes_challenge_for_matching_token() {
        let ctx = TestContext::new(Some("secret"));

        let (status, body) = ctx
            .get("/webhook?hub.mode=subscribe&hub.verify_token=secret&hub.challenge=1158201444")
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "1158201444");
    }

    #[tokio::test]
    async fn verification_rejects_wrong_token_or_mode() {
        let ctx = TestContext::new(Some("secret"));

        let (status, _) = ctx
            .get("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=1")
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = ctx
            .get("/webhook?hub.mode=unsubscribe&hub.verify_token=secret&hub.challenge=1")
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = ctx.get("/webhook").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn verification_without_configured_token_is_rejected() {
        let ctx = TestContext::new(None);

        let (status, _) = ctx.get("/webhook?hub.mode=subscribe&hub.challenge=1").await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn text_message_is_dispatched_and_answered() {
        let ctx = TestContext::new(Some("secret"));

        let status = ctx.post_text("34600111222", "/status").await;

        assert_eq!(status, StatusCode::OK);
        let sent = ctx.delivery.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "34600111222");
    }

    #[tokio::test]
    async fn malformed_payloads_are_acknowledged_without_reply() {
        let ctx = TestContext::new(Some("secret"));

        assert_eq!(ctx.post("not json").await, StatusCode::OK);
        assert_eq!(ctx.post("{}").await, StatusCode::OK);
        assert_eq!(
            ctx.post(json!({ "entry": [{ "changes": [] }] }).to_string())
                .await,
            StatusCode::OK
        );

        assert!(ctx.delivery.sent().is_empty());
    }

    #[tokio::test]
    async fn status_updates_and_media_are_ignored() {
        let ctx = TestContext::new(Some("secret"));
        let status_update = json!({
            "entry": [{ "changes": [{ "value": { "statuses": [{ "status": "read" }] } }] }]
        });
        let image = json!({
            "entry": [{ "changes": [{ "value": {
                "messages": [{ "from": "1", "type": "image", "image": { "id": "m" } }]
            } }] }]
        });

        assert_eq!(ctx.post(status_update.to_string()).await, StatusCode::OK);
        assert_eq!(ctx.post(image.to_string()).await, StatusCode::OK);

        assert!(ctx.delivery.sent().is_empty());
    }

    #[tokio::test]
    async fn reminder_can_be_created_over_http() {
        let ctx = TestContext::new(Some("secret"));

        for text in ["/crear_evento", "25/12/2030", "09:00", "Llamar a mamá"] {
            assert_eq!(ctx.post_text("34600111222", text).await, StatusCode::OK);
        }

        let reminders = ctx.reminders.get_all().await;
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].fire_at.to_string(), "25/12/2030 09:00");
        assert_eq!(reminders[0].user, "34600111222");
        assert_eq!(ctx.delivery.sent().len(), 4);
    }
}
