use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::appsettings::WhatsAppSettings;

use super::{DeliveryChannel, DeliveryError};

/// Sends plain text messages through the WhatsApp Cloud API.
pub struct WhatsAppDeliveryChannel {
    client: Client,
    settings: WhatsAppSettings,
}

impl WhatsAppDeliveryChannel {
    pub fn new(settings: WhatsAppSettings) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        if settings.access_token.is_none() || settings.phone_number_id.is_none() {
            log::warn!("WhatsApp credentials are missing, outgoing messages will be dropped");
        }

        Ok(Self { client, settings })
    }

    fn messages_url(&self, phone_number_id: &str) -> String {
        format!(
            "{}/{}/{}/messages",
            self.settings.api_base_url.trim_end_matches('/'),
            self.settings.api_version,
            phone_number_id
        )
    }
}

#[async_trait]
impl DeliveryChannel for WhatsAppDeliveryChannel {
    async fn send_message(&self, to: &str, text: &str) -> Result<(), DeliveryError> {
        let access_token = self
            .settings
            .access_token
            .as_deref()
            .ok_or(DeliveryError::NotConfigured("access token"))?;
        let phone_number_id = self
            .settings
            .phone_number_id
            .as_deref()
            .ok_or(DeliveryError::NotConfigured("phone number id"))?;

        let payload = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": text },
        });

        let response = self
            .client
            .post(self.messages_url(phone_number_id))
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        log::debug!("Delivered message. [to = {}, status = {}]", to, status);
        Ok(())
    }
}
