//! Calls out to GitHub, the fingerprint service, Neo4j and Slack.

pub mod database_service;
pub mod fingerprint_service;
pub mod github_service;
pub mod message_client;
pub mod slack_service;
