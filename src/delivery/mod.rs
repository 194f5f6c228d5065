mod whatsapp;

use async_trait::async_trait;
use thiserror::Error;

pub use whatsapp::WhatsAppDeliveryChannel;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Delivery channel is not configured: {0}")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Messaging API rejected the message ({status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Delivery timed out")]
    Timeout,
}

/// Outbound side of the bot. Every send is a single attempt.
#[async_trait]
pub trait DeliveryChannel: Send + Sync + 'static {
    async fn send_message(&self, to: &str, text: &str) -> Result<(), DeliveryError>;
}
