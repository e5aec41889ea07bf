//! Outbound chat messages.

use async_trait::async_trait;

use crate::models::message::SlackMessage;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Slack rejected message to {channel}: {error}")]
    Rejected { channel: String, error: String },
}

/// Delivers messages to channels and to the user who invoked a command.
#[async_trait]
pub trait MessageClient: Send + Sync {
    async fn address_channels(
        &self,
        message: &SlackMessage,
        channels: &[String],
    ) -> Result<(), MessageError>;

    async fn respond(&self, message: &SlackMessage, user: &str) -> Result<(), MessageError>;
}

/// Logs messages instead of sending them. Used when no Slack token is configured.
pub struct LogClient;

#[async_trait]
impl MessageClient for LogClient {
    async fn address_channels(
        &self,
        message: &SlackMessage,
        channels: &[String],
    ) -> Result<(), MessageError> {
        tracing::info!(channels = ?channels, text = %message.text, "chat message");
        Ok(())
    }

    async fn respond(&self, message: &SlackMessage, user: &str) -> Result<(), MessageError> {
        tracing::info!(user = %user, text = %message.text, "chat response");
        Ok(())
    }
}
