use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::delivery::{DeliveryChannel, DeliveryError};

pub type SentMessages = Arc<Mutex<Vec<(String, String)>>>;

/// Records every message instead of sending it. Optionally fails each send
/// after recording it.
#[derive(Clone, Default)]
pub struct RecordingDeliveryChannel {
    pub sent: SentMessages,
    pub fail: bool,
}

impl RecordingDeliveryChannel {
    pub fn failing() -> Self {
        Self {
            sent: SentMessages::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl DeliveryChannel for RecordingDeliveryChannel {
    async fn send_message(&self, to: &str, text: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));

        if self.fail {
            return Err(DeliveryError::NotConfigured("test channel"));
        }
        Ok(())
    }
}
