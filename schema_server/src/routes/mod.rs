//! HTTP routes — events, commands, GitHub webhook, Slack actions.

pub mod auth;
pub mod commands;
pub mod webhook;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::events::impact::ImpactEvent;
use crate::events::push::PushEvent;
use crate::handlers::{self, CommandInvocation, HandlerContext};
use crate::models::report::HandlerResultJson;
use crate::registry::{self, BindError, Registration};

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    pub ctx: HandlerContext,
}

pub fn router(state: AppState) -> Router {
    // Signed by their senders, so these carry their own checks.
    let signed = Router::new()
        .route("/webhook/github", post(webhook_handler))
        .route("/slack/actions", post(slack_actions_handler));

    let protected = Router::new()
        // Events
        .route("/events/push", post(push_event_handler))
        .route("/events/impact", post(impact_event_handler))
        // Commands
        .route("/commands", post(intent_handler))
        .route("/commands/{name}", post(command_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_token));

    Router::new()
        .route("/health", get(health))
        .route("/registrations", get(list_registrations))
        .merge(signed)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn list_registrations() -> Json<&'static [Registration]> {
    Json(registry::REGISTRATIONS.as_slice())
}

impl IntoResponse for BindError {
    fn into_response(self) -> Response {
        let status = match self {
            BindError::UnknownCommand(_) | BindError::NoMatchingIntent(_) => StatusCode::NOT_FOUND,
            BindError::NotACommand(_) | BindError::InvalidParameters { .. } => StatusCode::BAD_REQUEST,
        };
        tracing::debug!("Rejected command: {self}");
        (status, self.to_string()).into_response()
    }
}

// ── Events ──

fn subscription(name: &str) -> Result<&'static Registration, StatusCode> {
    registry::subscription(name).ok_or_else(|| {
        tracing::error!("No handler registered for subscription {name}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn push_event_handler(
    State(state): State<AppState>,
    Json(event): Json<PushEvent>,
) -> Result<Json<HandlerResultJson>, StatusCode> {
    crate::metrics::event_received("push");
    let registration = subscription("push")?;
    let result = handlers::run_push(&state.ctx, registration, &event).await;
    Ok(Json(result.into()))
}

async fn impact_event_handler(
    State(state): State<AppState>,
    Json(event): Json<ImpactEvent>,
) -> Result<Json<HandlerResultJson>, StatusCode> {
    crate::metrics::event_received("impact");
    let registration = subscription("impact")?;
    let result = handlers::run_impact(&state.ctx, registration, &event).await;
    Ok(Json(result.into()))
}

async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<HandlerResultJson>, StatusCode> {
    crate::metrics::event_received(
        headers
            .get("x-github-event")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown"),
    );

    webhook::handle_webhook(&state.ctx, &headers, body).await
}

// ── Commands ──

async fn command_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(invocation): Json<CommandInvocation>,
) -> Result<Json<HandlerResultJson>, BindError> {
    crate::metrics::event_received("command");
    let registration = registry::command(&name).ok_or(BindError::UnknownCommand(name))?;
    let result = handlers::run_command(&state.ctx, registration, invocation).await?;
    Ok(Json(result.into()))
}

async fn intent_handler(
    State(state): State<AppState>,
    Json(request): Json<commands::IntentRequest>,
) -> Result<Json<HandlerResultJson>, BindError> {
    crate::metrics::event_received("command");
    commands::run_intent(&state.ctx, request).await.map(Json)
}

async fn slack_actions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    crate::metrics::event_received("slack_action");
    commands::handle_slack_action(&state.ctx, &headers, &body).await
}
