//! Liveness check from chat.

use crate::handlers::HandlerContext;
use crate::models::message::{self, SlackMessage};
use crate::models::report::HandlerResult;

pub async fn handle(ctx: &HandlerContext, user: &str) -> HandlerResult {
    let name_and_version = format!("{}:{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    let text = format!("Hello {} from {}", message::user(user), name_and_version);

    ctx.respond(&SlackMessage::text(text.clone()), user).await;
    HandlerResult::succeeded(text)
}
