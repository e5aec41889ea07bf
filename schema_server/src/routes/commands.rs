//! Command invocation from chat text and from Slack button clicks.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::handlers::{self, CommandInvocation, HandlerContext};
use crate::models::message::CommandBinding;
use crate::models::report::HandlerResultJson;
use crate::registry::{self, BindError};
use crate::services::slack_service;

/// Free-text command, e.g. `deploy graphql schema ref=abc123 database=production`.
#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub user: String,
    pub text: String,
    #[serde(default)]
    pub token: Option<String>,
}

pub async fn run_intent(
    ctx: &HandlerContext,
    request: IntentRequest,
) -> Result<HandlerResultJson, BindError> {
    let (registration, parameters) = registry::match_intent(&request.text)?;
    let invocation = CommandInvocation {
        user: request.user,
        parameters,
        token: request.token,
    };
    let result = handlers::run_command(ctx, registration, invocation).await?;
    Ok(result.into())
}

#[derive(Debug, Deserialize)]
struct ActionPayload {
    user: ActionUser,
    #[serde(default)]
    actions: Vec<ClickedAction>,
}

#[derive(Debug, Deserialize)]
struct ActionUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ClickedAction {
    #[serde(default)]
    value: Option<String>,
}

/// Recover the command invocation bound to a clicked button from the
/// form-encoded interactive request body.
pub fn invocation_from_action(body: &[u8]) -> Option<(CommandBinding, String)> {
    let payload = url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())?;

    let payload: ActionPayload = match serde_json::from_str(&payload) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Unreadable Slack action payload: {e}");
            return None;
        }
    };

    let value = payload.actions.into_iter().find_map(|a| a.value)?;
    let binding: CommandBinding = serde_json::from_str(&value).ok()?;
    Some((binding, payload.user.id))
}

/// Handle a Slack interactive request. The command runs before Slack gets its
/// acknowledgement; results reach the user as chat messages.
pub async fn handle_slack_action(ctx: &HandlerContext, headers: &HeaderMap, body: &[u8]) -> Response {
    if !slack_service::validate_signature(
        &ctx.config.slack_signing_secret,
        header(headers, "x-slack-request-timestamp"),
        body,
        header(headers, "x-slack-signature"),
    ) {
        tracing::warn!("Slack signature validation failed");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let Some((binding, user)) = invocation_from_action(body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let registration = match registry::command(&binding.command) {
        Some(r) => r,
        None => return BindError::UnknownCommand(binding.command).into_response(),
    };

    let invocation = CommandInvocation {
        user,
        parameters: binding.parameters,
        token: None,
    };
    match handlers::run_command(ctx, registration, invocation).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
