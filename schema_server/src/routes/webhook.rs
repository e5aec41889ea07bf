//! GitHub webhook handler: turns push deliveries into push events.

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::events::push::PushEvent;
use crate::handlers::{self, HandlerContext};
use crate::models::report::{HandlerResult, HandlerResultJson};
use crate::registry;
use crate::services::github_service;

/// Handle an incoming GitHub webhook payload.
pub async fn handle_webhook(
    ctx: &HandlerContext,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Json<HandlerResultJson>, StatusCode> {
    // Validate signature
    let signature = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !github_service::validate_signature(&ctx.config.github_webhook_secret, &body, signature) {
        tracing::warn!("Webhook signature validation failed");
        return Err(StatusCode::UNAUTHORIZED);
    }

    // Parse event type
    let event_type = headers
        .get("x-github-event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| StatusCode::BAD_REQUEST)?;

    let result = match event_type {
        "push" => handle_push(ctx, &payload).await?,
        "ping" => {
            tracing::info!("Received GitHub ping webhook");
            HandlerResult::skipped("ping")
        }
        _ => {
            tracing::debug!("Ignoring webhook event: {}", event_type);
            HandlerResult::skipped(format!("ignoring {event_type} event"))
        }
    };

    Ok(Json(result.into()))
}

async fn handle_push(
    ctx: &HandlerContext,
    payload: &serde_json::Value,
) -> Result<HandlerResult, StatusCode> {
    let Some(event) = PushEvent::from_github(payload) else {
        tracing::debug!("Push is not a branch update, ignoring");
        return Ok(HandlerResult::skipped("not a branch push"));
    };

    let registration = registry::subscription("push").ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(handlers::run_push(ctx, registration, &event).await)
}
