use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookPayloadError {
    #[error("Body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundContent {
    Text(String),
    Other(String),
}

/// First message of a Cloud API notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub from: String,
    pub content: InboundContent,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    entry: Option<Vec<WebhookEntry>>,
}

#[derive(Debug, Deserialize)]
struct WebhookEntry {
    changes: Option<Vec<WebhookChange>>,
}

#[derive(Debug, Deserialize)]
struct WebhookChange {
    value: Option<WebhookChangeValue>,
}

#[derive(Debug, Deserialize)]
struct WebhookChangeValue {
    messages: Option<Vec<WebhookMessage>>,
}

#[derive(Debug, Deserialize)]
struct WebhookMessage {
    from: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<WebhookText>,
}

#[derive(Debug, Deserialize)]
struct WebhookText {
    body: Option<String>,
}

/// Returns `Ok(None)` for notifications that carry no message, such as
/// delivery status updates.
pub fn extract_message(body: &[u8]) -> Result<Option<InboundMessage>, WebhookPayloadError> {
    let payload: WebhookPayload = serde_json::from_slice(body)?;

    let value = payload
        .entry
        .and_then(|entries| entries.into_iter().next())
        .ok_or(WebhookPayloadError::MissingField("entry"))?
        .changes
        .and_then(|changes| changes.into_iter().next())
        .ok_or(WebhookPayloadError::MissingField("changes"))?
        .value
        .ok_or(WebhookPayloadError::MissingField("value"))?;

    let Some(message) = value.messages.and_then(|messages| messages.into_iter().next()) else {
        return Ok(None);
    };

    let from = message
        .from
        .ok_or(WebhookPayloadError::MissingField("from"))?;
    let kind = message
        .kind
        .ok_or(WebhookPayloadError::MissingField("type"))?;

    let content = if kind == "text" {
        let body = message
            .text
            .and_then(|text| text.body)
            .ok_or(WebhookPayloadError::MissingField("text.body"))?;
        InboundContent::Text(body)
    } else {
        InboundContent::Other(kind)
    };

    Ok(Some(InboundMessage { from, content }))
}
