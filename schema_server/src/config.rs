//! Automation configuration: loaded once from environment variables.

use crate::models::deploy::Environment;
use crate::models::repo::SchemaLocation;

/// Database endpoint and credential for one deploy target.
#[derive(Clone, Debug, Default)]
pub struct DatabaseTarget {
    pub url: String,
    pub token: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// GitHub token used for the contents API.
    pub github_token: String,
    /// GitHub webhook secret for HMAC validation.
    pub github_webhook_secret: String,
    /// The one repository and file this automation tracks.
    pub schema: SchemaLocation,
    /// Workspace (team) the fingerprints are reported under.
    pub team_id: String,
    /// Channels receiving failure notices, deploy suggestions and audit messages.
    pub reporting_channels: Vec<String>,
    /// Base URL of the fingerprint ingestion webhook.
    pub webhook_url: String,
    pub staging: DatabaseTarget,
    pub production: DatabaseTarget,
    /// Slack bot token. Empty means messages are only logged.
    pub slack_bot_token: String,
    /// Slack signing secret for interactive payloads.
    pub slack_signing_secret: String,
    pub slack_api_url: String,
    /// Bearer token required on the JSON event and command routes.
    pub command_token: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let github_token = std::env::var("GITHUB_TOKEN").unwrap_or_default();
        let github_webhook_secret = std::env::var("GITHUB_WEBHOOK_SECRET").unwrap_or_default();

        let schema = SchemaLocation {
            base_url: var_or("GITHUB_BASE_URL", "https://www.github.com"),
            api_url: var_or("GITHUB_API_URL", "https://api.github.com"),
            owner: var_or("SCHEMA_OWNER", "atomisthq"),
            name: var_or("SCHEMA_REPO", "neo4j-ingester"),
            path: var_or("SCHEMA_PATH", "resources/schema.idl"),
        };

        let team_id = var_or("TEAM_ID", "T29E48P34");
        let reporting_channels = parse_channels(&var_or("REPORTING_CHANNELS", "neo4j-ingester"));
        let webhook_url = var_or("ATOMIST_WEBHOOK_URL", "https://webhook.atomist.com/atomist");

        let staging = DatabaseTarget {
            url: std::env::var("STAGING_DB_URL").unwrap_or_default(),
            token: std::env::var("STAGING_DB_TOKEN").unwrap_or_default(),
        };
        let production = DatabaseTarget {
            url: std::env::var("PRODUCTION_DB_URL").unwrap_or_default(),
            token: std::env::var("PRODUCTION_DB_TOKEN").unwrap_or_default(),
        };

        let slack_bot_token = std::env::var("SLACK_BOT_TOKEN").unwrap_or_default();
        let slack_signing_secret = std::env::var("SLACK_SIGNING_SECRET").unwrap_or_default();
        let slack_api_url = var_or("SLACK_API_URL", "https://slack.com/api");
        let command_token = std::env::var("COMMAND_TOKEN").unwrap_or_default();

        if github_token.is_empty() {
            tracing::warn!("GITHUB_TOKEN not set -- schema fetches will be unauthenticated");
        }
        if github_webhook_secret.is_empty() {
            tracing::warn!("GITHUB_WEBHOOK_SECRET not set -- webhook signature validation disabled");
        }
        if staging.url.is_empty() {
            tracing::warn!("STAGING_DB_URL not set -- staging deploys will fail");
        }
        if production.url.is_empty() {
            tracing::warn!("PRODUCTION_DB_URL not set -- production deploys will fail");
        }
        if command_token.is_empty() {
            tracing::warn!("COMMAND_TOKEN not set -- event and command routes are unauthenticated");
        }
        if slack_bot_token.is_empty() {
            tracing::warn!("SLACK_BOT_TOKEN not set -- chat messages will only be logged");
        }

        Self {
            github_token,
            github_webhook_secret,
            schema,
            team_id,
            reporting_channels,
            webhook_url,
            staging,
            production,
            slack_bot_token,
            slack_signing_secret,
            slack_api_url,
            command_token,
        }
    }

    /// Database target for a deploy environment.
    pub fn database(&self, environment: Environment) -> &DatabaseTarget {
        match environment {
            Environment::Staging => &self.staging,
            Environment::Production => &self.production,
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_channels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
