//! Local stand-ins for GitHub, the fingerprint service, Neo4j and Slack.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

use crate::config::{AppConfig, DatabaseTarget};
use crate::handlers::HandlerContext;
use crate::models::message::SlackMessage;
use crate::models::repo::SchemaLocation;
use crate::services::message_client::{MessageClient, MessageError};

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct StubState {
    schemas: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<Recorded>>,
    fail_fingerprints: Mutex<bool>,
    fail_database: Mutex<bool>,
    fail_slack: Mutex<bool>,
    failing_channels: Mutex<Vec<String>>,
}

/// An HTTP server on an ephemeral local port.
pub struct StubServer {
    pub url: String,
    state: Arc<StubState>,
}

impl StubServer {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(stub_handler).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Serve `idl` as the schema file at `git_ref`.
    pub fn set_schema(&self, git_ref: &str, idl: &str) {
        self.state
            .schemas
            .lock()
            .unwrap()
            .insert(git_ref.to_string(), idl.to_string());
    }

    pub fn fail_fingerprints(&self) {
        *self.state.fail_fingerprints.lock().unwrap() = true;
    }

    pub fn fail_database(&self) {
        *self.state.fail_database.lock().unwrap() = true;
    }

    pub fn fail_slack(&self) {
        *self.state.fail_slack.lock().unwrap() = true;
    }

    /// Reject `chat.postMessage` for one channel only.
    pub fn fail_slack_channel(&self, channel: &str) {
        self.state
            .failing_channels
            .lock()
            .unwrap()
            .push(channel.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }
}

async fn stub_handler(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().map(str::to_string);
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    if path.starts_with("/repos/") && method == Method::GET {
        let git_ref = url::form_urlencoded::parse(query.as_deref().unwrap_or_default().as_bytes())
            .find(|(key, _)| key == "ref")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        let idl = state.schemas.lock().unwrap().get(&git_ref).cloned();
        return match idl {
            Some(idl) => Json(json!({
                "name": "schema.idl",
                "encoding": "base64",
                "content": github_wrap(&STANDARD.encode(idl)),
            }))
            .into_response(),
            None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response(),
        };
    }

    if path.starts_with("/fingerprints/teams/") {
        if *state.fail_fingerprints.lock().unwrap() {
            return (StatusCode::INTERNAL_SERVER_ERROR, "fingerprint rejected").into_response();
        }
        return StatusCode::OK.into_response();
    }

    if path == "/graphql/idl/" {
        if *state.fail_database.lock().unwrap() {
            return (StatusCode::INTERNAL_SERVER_ERROR, "schema rejected").into_response();
        }
        return StatusCode::OK.into_response();
    }

    if path == "/chat.postMessage" {
        let channel = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["channel"].as_str().map(str::to_string))
            .unwrap_or_default();
        let channel_fails = state.failing_channels.lock().unwrap().contains(&channel);
        if channel_fails || *state.fail_slack.lock().unwrap() {
            return Json(json!({ "ok": false, "error": "channel_not_found" })).into_response();
        }
        return Json(json!({ "ok": true })).into_response();
    }

    StatusCode::NOT_FOUND.into_response()
}

/// GitHub breaks base64 content into 60-character lines.
fn github_wrap(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Configuration with every outbound URL pointed at `url`.
pub fn config(url: &str) -> AppConfig {
    AppConfig {
        github_token: "gh-token".to_string(),
        github_webhook_secret: String::new(),
        schema: SchemaLocation {
            base_url: "https://www.github.com".to_string(),
            api_url: url.to_string(),
            owner: "atomisthq".to_string(),
            name: "neo4j-ingester".to_string(),
            path: "resources/schema.idl".to_string(),
        },
        team_id: "T1".to_string(),
        reporting_channels: vec!["neo4j-ingester".to_string()],
        webhook_url: url.to_string(),
        staging: DatabaseTarget {
            url: url.to_string(),
            token: "staging-token".to_string(),
        },
        production: DatabaseTarget {
            url: url.to_string(),
            token: "production-token".to_string(),
        },
        slack_bot_token: String::new(),
        slack_signing_secret: String::new(),
        slack_api_url: url.to_string(),
        command_token: String::new(),
    }
}

/// Where a recorded message went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Channels(Vec<String>),
    User(String),
}

/// Keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingClient {
    sent: Mutex<Vec<(Destination, SlackMessage)>>,
}

impl RecordingClient {
    pub fn sent(&self) -> Vec<(Destination, SlackMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageClient for RecordingClient {
    async fn address_channels(
        &self,
        message: &SlackMessage,
        channels: &[String],
    ) -> Result<(), MessageError> {
        self.sent
            .lock()
            .unwrap()
            .push((Destination::Channels(channels.to_vec()), message.clone()));
        Ok(())
    }

    async fn respond(&self, message: &SlackMessage, user: &str) -> Result<(), MessageError> {
        self.sent
            .lock()
            .unwrap()
            .push((Destination::User(user.to_string()), message.clone()));
        Ok(())
    }
}

/// A handler context against `stub`, recording chat output.
pub fn context(stub: &StubServer) -> (HandlerContext, Arc<RecordingClient>) {
    let recorder = Arc::new(RecordingClient::default());
    let ctx = HandlerContext {
        config: Arc::new(config(&stub.url)),
        http: reqwest::Client::new(),
        messages: recorder.clone(),
    };
    (ctx, recorder)
}
