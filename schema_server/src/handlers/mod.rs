//! Event and command handlers, and dispatch from the registration table.

pub mod hello_world;
pub mod notice_schema_change;
pub mod push_schema_to_neo;
pub mod suggest_schema_deploy;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::config::AppConfig;
use crate::events::impact::ImpactEvent;
use crate::events::push::PushEvent;
use crate::models::message::SlackMessage;
use crate::models::report::HandlerResult;
use crate::registry::{BindError, HandlerKind, Registration};
use crate::services::message_client::MessageClient;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct HandlerContext {
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
    pub messages: Arc<dyn MessageClient>,
}

impl HandlerContext {
    /// Send to the reporting channels. Delivery failures are logged, not returned.
    pub async fn address_channels(&self, message: &SlackMessage) {
        if let Err(e) = self
            .messages
            .address_channels(message, &self.config.reporting_channels)
            .await
        {
            tracing::error!("Failed to message reporting channels: {e}");
            crate::metrics::message_failed("channels");
        }
    }

    /// Reply to the user who invoked a command.
    pub async fn respond(&self, message: &SlackMessage, user: &str) {
        if let Err(e) = self.messages.respond(message, user).await {
            tracing::error!(user = %user, "Failed to respond: {e}");
            crate::metrics::message_failed("respond");
        }
    }
}

/// A command run by name, from a button or a direct request.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandInvocation {
    /// Chat user ID of the invoker.
    pub user: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// GitHub token of the invoker. Falls back to the configured token.
    #[serde(default)]
    pub token: Option<String>,
}

/// Run a command registration with bound parameters.
pub async fn run_command(
    ctx: &HandlerContext,
    registration: &Registration,
    invocation: CommandInvocation,
) -> Result<HandlerResult, BindError> {
    let span = tracing::info_span!(
        "command",
        handler = registration.name,
        user = %invocation.user,
        invocation_id = %uuid::Uuid::new_v4(),
    );

    let result = match registration.kind {
        HandlerKind::HelloWorld => hello_world::handle(ctx, &invocation.user)
            .instrument(span)
            .await,
        HandlerKind::PushSchemaToNeo => {
            let params: push_schema_to_neo::PushSchemaParams = bind(registration, invocation.parameters)?;
            let token = invocation
                .token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| ctx.config.github_token.clone());
            let request = params.into_request(invocation.user);
            push_schema_to_neo::handle(ctx, &token, &request)
                .instrument(span)
                .await
        }
        HandlerKind::NoticeSchemaChange | HandlerKind::SuggestSchemaDeploy => {
            return Err(BindError::NotACommand(registration.name.to_string()));
        }
    };

    log_result(registration, &result);
    Ok(result)
}

pub async fn run_push(ctx: &HandlerContext, registration: &Registration, event: &PushEvent) -> HandlerResult {
    let span = tracing::info_span!(
        "event",
        handler = registration.name,
        sha = %event.after_sha,
        invocation_id = %uuid::Uuid::new_v4(),
    );
    let result = notice_schema_change::handle(ctx, event).instrument(span).await;
    log_result(registration, &result);
    result
}

pub async fn run_impact(
    ctx: &HandlerContext,
    registration: &Registration,
    event: &ImpactEvent,
) -> HandlerResult {
    let span = tracing::info_span!(
        "event",
        handler = registration.name,
        sha = %event.after_sha,
        invocation_id = %uuid::Uuid::new_v4(),
    );
    let result = suggest_schema_deploy::handle(ctx, event).instrument(span).await;
    log_result(registration, &result);
    result
}

fn bind<T: serde::de::DeserializeOwned>(
    registration: &Registration,
    parameters: Map<String, Value>,
) -> Result<T, BindError> {
    serde_json::from_value(Value::Object(parameters)).map_err(|source| BindError::InvalidParameters {
        command: registration.name.to_string(),
        source,
    })
}

fn log_result(registration: &Registration, result: &HandlerResult) {
    match result {
        HandlerResult::Skipped { reason } => {
            tracing::debug!(handler = registration.name, "Skipped: {reason}")
        }
        HandlerResult::Succeeded { message } => {
            tracing::info!(handler = registration.name, "Succeeded: {message}")
        }
        HandlerResult::Failed { message } => {
            tracing::warn!(handler = registration.name, "Failed: {message}")
        }
    }
}
