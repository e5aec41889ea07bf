//! Offer a deploy button when a push changed the schema fingerprint.

use serde_json::{Map, Value};

use crate::events::impact::{ImpactEvent, SCHEMA_FINGERPRINT};
use crate::handlers::{push_schema_to_neo, HandlerContext};
use crate::models::deploy::Environment;
use crate::models::message::{self, button_for_command, Attachment, SlackMessage};
use crate::models::repo::SchemaLocation;
use crate::models::report::HandlerResult;

pub async fn handle(ctx: &HandlerContext, event: &ImpactEvent) -> HandlerResult {
    let schema = &ctx.config.schema;

    if !schema.matches(&event.repo.owner, &event.repo.name) {
        return HandlerResult::skipped(format!("not {}", schema.name));
    }
    if !event.changed(SCHEMA_FINGERPRINT) {
        return HandlerResult::skipped(format!("{SCHEMA_FINGERPRINT} didn't change"));
    }

    let environment = Environment::for_branch(event.on_default_branch());
    let message = construct_message(schema, environment, &event.branch, &event.after_sha);
    ctx.address_channels(&message).await;

    HandlerResult::succeeded(format!(
        "suggested {environment} deploy of {} from {}",
        event.after_sha, event.branch
    ))
}

/// Schema-updated notice with a button running the deploy command.
pub fn construct_message(
    schema: &SchemaLocation,
    environment: Environment,
    branch: &str,
    git_ref: &str,
) -> SlackMessage {
    let mut parameters = Map::new();
    parameters.insert("database".into(), Value::from(environment.as_str()));
    parameters.insert("ref".into(), Value::from(git_ref));
    parameters.insert("ref_description".into(), Value::from(branch));

    let buttons = Attachment {
        fallback: "deploy graphql button".to_string(),
        callback_id: Some(push_schema_to_neo::NAME.to_string()),
        actions: vec![button_for_command(
            &format!("Push to {environment}"),
            push_schema_to_neo::NAME,
            parameters,
        )],
    };

    SlackMessage {
        text: format!(
            "The GraphQL schema was updated in {}.",
            message::url(&schema.link(git_ref), branch)
        ),
        attachments: vec![buttons],
    }
}
