//! Deploy the schema at a ref to a Neo4j database.

use serde::Deserialize;

use crate::config::DatabaseTarget;
use crate::handlers::HandlerContext;
use crate::models::deploy::{DeployRequest, Environment};
use crate::models::message::{self, SlackMessage};
use crate::models::report::{HandlerResult, Report};
use crate::services::{database_service, github_service};

/// Command name buttons refer to.
pub const NAME: &str = "PushSchemaToNeo";

#[derive(Debug, Clone, Deserialize)]
pub struct PushSchemaParams {
    /// Branch or SHA to publish the schema from.
    #[serde(rename = "ref", default = "default_ref")]
    pub git_ref: String,
    #[serde(default)]
    pub database: Environment,
    /// How to describe the branch or SHA in messages.
    #[serde(default)]
    pub ref_description: Option<String>,
}

fn default_ref() -> String {
    "master".to_string()
}

impl PushSchemaParams {
    pub fn into_request(self, invoking_user: String) -> DeployRequest {
        let ref_description = self
            .ref_description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.git_ref.clone());
        DeployRequest {
            git_ref: self.git_ref,
            environment: self.database,
            invoking_user,
            ref_description,
        }
    }
}

pub async fn handle(ctx: &HandlerContext, github_token: &str, request: &DeployRequest) -> HandlerResult {
    let target = ctx.config.database(request.environment);
    let user = &request.invoking_user;

    match push_schema_to_neo(ctx, github_token, target, &request.git_ref).await {
        Err(report) => {
            crate::metrics::deploy_completed(request.environment.as_str(), "failure");
            ctx.respond(&SlackMessage::text(format!("It failed. {report}")), user)
                .await;
            HandlerResult::failed(report.to_string())
        }
        Ok(()) => {
            crate::metrics::deploy_completed(request.environment.as_str(), "success");
            publish_audit_trail(ctx, request).await;
            ctx.respond(&SlackMessage::text("It thinks it succeeded"), user)
                .await;
            HandlerResult::succeeded(format!(
                "deployed {} to {}",
                request.git_ref, request.environment
            ))
        }
    }
}

async fn push_schema_to_neo(
    ctx: &HandlerContext,
    github_token: &str,
    target: &DatabaseTarget,
    git_ref: &str,
) -> Result<(), Report> {
    let idl = github_service::get_schema_contents(&ctx.http, &ctx.config.schema, github_token, git_ref).await?;
    database_service::push_to_database(&ctx.http, &target.url, &target.token, idl).await
}

async fn publish_audit_trail(ctx: &HandlerContext, request: &DeployRequest) {
    let link = message::url(
        &ctx.config.schema.link(&request.git_ref),
        &request.ref_description,
    );
    let text = format!(
        "{} updated the GraphQL schema in {} from {}",
        message::user(&request.invoking_user),
        request.environment,
        link
    );
    ctx.address_channels(&SlackMessage::text(text)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, Destination, StubServer};

    fn request(git_ref: &str, environment: Environment, description: Option<&str>) -> DeployRequest {
        PushSchemaParams {
            git_ref: git_ref.to_string(),
            database: environment,
            ref_description: description.map(str::to_string),
        }
        .into_request("U7".to_string())
    }

    #[test]
    fn description_defaults_to_ref() {
        assert_eq!(request("abc123", Environment::Staging, None).ref_description, "abc123");
        assert_eq!(request("abc123", Environment::Staging, Some("")).ref_description, "abc123");
        assert_eq!(request("abc123", Environment::Staging, Some("master")).ref_description, "master");
    }

    #[tokio::test]
    async fn deploys_and_audits() {
        let stub = StubServer::start().await;
        stub.set_schema("abc123", "type Hoo { deHoo: String }");
        let (ctx, recorder) = test_support::context(&stub);

        let result = handle(&ctx, "tok", &request("abc123", Environment::Production, Some("master"))).await;

        assert_eq!(result, HandlerResult::succeeded("deployed abc123 to production"));
        let upload = &stub.requests_to("/graphql/idl/")[0];
        assert_eq!(upload.body, "type Hoo { deHoo: String }");
        assert_eq!(upload.authorization.as_deref(), Some("Basic production-token"));

        let sent = recorder.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, Destination::Channels(vec!["neo4j-ingester".into()]));
        assert_eq!(
            sent[0].1.text,
            "<@U7> updated the GraphQL schema in production from \
             <https://www.github.com/atomisthq/neo4j-ingester/tree/abc123/resources/schema.idl|master>"
        );
        assert_eq!(sent[1].0, Destination::User("U7".into()));
        assert_eq!(sent[1].1.text, "It thinks it succeeded");
    }

    #[tokio::test]
    async fn fetch_failure_is_reported_to_invoker() {
        let stub = StubServer::start().await;
        let (ctx, recorder) = test_support::context(&stub);

        let result = handle(&ctx, "tok", &request("nope", Environment::Staging, None)).await;

        assert_eq!(result, HandlerResult::failed("404 Not Found"));
        assert!(stub.requests_to("/graphql/idl/").is_empty());
        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Destination::User("U7".into()));
        assert_eq!(sent[0].1.text, "It failed. 404 Not Found");
    }

    #[tokio::test]
    async fn database_failure_skips_audit() {
        let stub = StubServer::start().await;
        stub.set_schema("abc123", "type A { b: Int }");
        stub.fail_database();
        let (ctx, recorder) = test_support::context(&stub);

        let result = handle(&ctx, "tok", &request("abc123", Environment::Staging, None)).await;

        assert_eq!(result.code(), 1);
        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.text.starts_with("It failed. Failure posting to "));
        assert!(sent[0].1.text.contains("/graphql/idl/: 500 Internal Server Error"));
        assert!(sent[0].1.text.ends_with("Response body: schema rejected"));
    }
}
