//! Fingerprint the schema on every push and report it.
//!
//! The fingerprint service compares the fingerprints of a push's before and
//! after commits and emits an impact event when they differ; see
//! [`super::suggest_schema_deploy`].

use crate::events::push::PushEvent;
use crate::handlers::HandlerContext;
use crate::models::message::{self, SlackMessage};
use crate::models::report::{HandlerResult, Report};
use crate::services::fingerprint_service::{calculate_fingerprint, push_fingerprint};
use crate::services::github_service;

pub async fn handle(ctx: &HandlerContext, event: &PushEvent) -> HandlerResult {
    let config = &ctx.config;

    if !config.schema.matches(&event.repo.owner, &event.repo.name) {
        return HandlerResult::skipped("This is not the repo I care about");
    }

    let token = config.github_token.as_str();
    let (_, pushed) = tokio::join!(
        fingerprint_if_possible(ctx, token, event.before_sha.as_deref()),
        fingerprint_commit(ctx, token, &event.after_sha),
    );

    match pushed {
        Ok(fingerprint) => HandlerResult::succeeded(format!("reported fingerprint {fingerprint}")),
        Err(report) => {
            let link = message::url(&config.schema.link(&event.after_sha), &event.after_sha);
            let text = format!("FYI: I couldn't fingerprint the schema in {link}: {report}");
            ctx.address_channels(&SlackMessage::text(text)).await;
            HandlerResult::failed(report.to_string())
        }
    }
}

/// Fetch, fingerprint and publish the schema at one commit.
async fn fingerprint_commit(ctx: &HandlerContext, token: &str, sha: &str) -> Result<String, Report> {
    let config = &ctx.config;
    let idl = github_service::get_schema_contents(&ctx.http, &config.schema, token, sha).await?;
    let fingerprint = calculate_fingerprint(&idl);
    push_fingerprint(
        &ctx.http,
        &config.webhook_url,
        &config.schema,
        &config.team_id,
        sha,
        &fingerprint,
    )
    .await
}

/// Publish the fingerprint of the push's before commit too, in case we were not
/// running when it was pushed; without it the service has nothing to diff the
/// after commit against. A first commit has nothing to fetch, so every failure
/// here is logged and dropped.
async fn fingerprint_if_possible(ctx: &HandlerContext, token: &str, sha: Option<&str>) {
    let Some(sha) = sha else {
        return;
    };
    if let Err(report) = fingerprint_commit(ctx, token, sha).await {
        tracing::warn!(sha = %sha, error = %report, "could not fingerprint before commit, ignoring");
        crate::metrics::backfill_failed();
    }
}
