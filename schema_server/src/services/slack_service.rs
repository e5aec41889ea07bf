//! Slack integration: `chat.postMessage` and interactive request signing.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::models::message::SlackMessage;
use crate::services::message_client::{MessageClient, MessageError};

type HmacSha256 = Hmac<Sha256>;

/// Requests older than this are treated as replays.
const MAX_REQUEST_AGE_SECS: u64 = 60 * 5;

/// Validate an interactive request against the Slack signing secret
/// (`X-Slack-Signature` over `v0:<X-Slack-Request-Timestamp>:<body>`).
pub fn validate_signature(secret: &str, timestamp: &str, payload: &[u8], signature: &str) -> bool {
    if secret.is_empty() {
        tracing::warn!("Slack signing secret not configured, skipping validation");
        return true;
    }

    let Ok(ts) = timestamp.parse::<u64>() else {
        return false;
    };
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    if now.abs_diff(ts) > MAX_REQUEST_AGE_SECS {
        tracing::warn!(timestamp = ts, "Stale Slack request rejected");
        return false;
    }

    let sig = signature.strip_prefix("v0=").unwrap_or(signature);
    let sig_bytes = match hex::decode(sig) {
        Ok(b) => b,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(format!("v0:{timestamp}:").as_bytes());
    mac.update(payload);

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Posts messages with a bot token.
pub struct SlackClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SlackEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    pub fn new(client: reqwest::Client, api_url: &str, token: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    async fn post_message(&self, channel: &str, message: &SlackMessage) -> Result<(), MessageError> {
        let mut body = serde_json::to_value(message).unwrap_or_default();
        body["channel"] = serde_json::Value::String(channel.to_string());

        let envelope: SlackEnvelope = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !envelope.ok {
            return Err(MessageError::Rejected {
                channel: channel.to_string(),
                error: envelope.error.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MessageClient for SlackClient {
    async fn address_channels(
        &self,
        message: &SlackMessage,
        channels: &[String],
    ) -> Result<(), MessageError> {
        let mut first_error = None;
        for channel in channels {
            let channel = if channel.starts_with('#') || channel.starts_with('C') {
                channel.clone()
            } else {
                format!("#{channel}")
            };
            if let Err(e) = self.post_message(&channel, message).await {
                tracing::warn!(channel = %channel, error = %e, "Slack delivery failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// A user ID as channel opens a direct message.
    async fn respond(&self, message: &SlackMessage, user: &str) -> Result<(), MessageError> {
        self.post_message(user, message).await
    }
}
