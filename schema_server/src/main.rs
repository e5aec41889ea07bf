//! GraphQL schema automation.
//!
//! Watches one repository's schema file: fingerprints it on every push and
//! reports the fingerprint, offers a deploy button in chat when the
//! fingerprint service says it changed, and deploys it to a Neo4j database
//! on command.

mod config;
mod events;
mod handlers;
mod metrics;
mod models;
mod registry;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use crate::handlers::HandlerContext;
use crate::services::message_client::{LogClient, MessageClient};
use crate::services::slack_service::SlackClient;

#[derive(Parser)]
#[command(name = "automate-graphql-schema", about = "GraphQL schema fingerprint and deploy automation")]
struct Cli {
    /// Server port
    #[arg(short, long, env = "SCHEMA_PORT", default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let cli = Cli::parse();

    tracing::info!("Starting GraphQL schema automation...");

    let config = Arc::new(config::AppConfig::from_env());
    tracing::info!(
        owner = %config.schema.owner,
        repo = %config.schema.name,
        path = %config.schema.path,
        channels = ?config.reporting_channels,
        "Tracking schema"
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let messages: Arc<dyn MessageClient> = if config.slack_bot_token.is_empty() {
        Arc::new(LogClient)
    } else {
        Arc::new(SlackClient::new(
            http.clone(),
            &config.slack_api_url,
            &config.slack_bot_token,
        ))
    };

    let state = routes::AppState {
        ctx: HandlerContext {
            config,
            http,
            messages,
        },
    };
    let app = routes::router(state);

    // Initialize metrics
    metrics::init_metrics();

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!("Schema automation listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
