//! GitHub integration — webhook validation and schema file contents.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use crate::models::repo::SchemaLocation;
use crate::models::report::Report;

type HmacSha256 = Hmac<Sha256>;

const USER_AGENT: &str = "automate-graphql-schema";

/// Validate a GitHub webhook signature (X-Hub-Signature-256).
pub fn validate_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    if secret.is_empty() {
        tracing::warn!("Webhook secret not configured, skipping validation");
        return true;
    }

    let sig = signature.strip_prefix("sha256=").unwrap_or(signature);
    let sig_bytes = match hex::decode(sig) {
        Ok(b) => b,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Fetch the tracked schema file at a branch or commit.
///
/// Any failure comes back as a [`Report`]; nothing is retried.
pub async fn get_schema_contents(
    client: &reqwest::Client,
    location: &SchemaLocation,
    token: &str,
    git_ref: &str,
) -> Result<String, Report> {
    let url = location.contents_url(&location.at(git_ref));

    let result = fetch_contents(client, &url, git_ref, token).await;
    if let Err(report) = &result {
        tracing::warn!(url = %url, git_ref = %git_ref, error = %report, "failed to fetch file");
    }
    result
}

async fn fetch_contents(
    client: &reqwest::Client,
    url: &str,
    git_ref: &str,
    token: &str,
) -> Result<String, Report> {
    let mut request = client
        .get(url)
        .query(&[("ref", git_ref)])
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", USER_AGENT);
    if !token.is_empty() {
        request = request.header("Authorization", format!("token {token}"));
    }

    let resp = request
        .send()
        .await
        .map_err(|e| Report::Api(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Report::Api(status.to_string()));
    }

    let text = resp.text().await.map_err(|e| Report::Api(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(Report::NoData("(empty response)".to_string()));
    }
    let data: Value =
        serde_json::from_str(&text).map_err(|e| Report::NoData(format!("{e}: {text}")))?;

    decode_content(&data)
}

/// Pull the base64 `content` field out of a contents API response.
pub fn decode_content(data: &Value) -> Result<String, Report> {
    if data.is_null() {
        return Err(Report::NoData(data.to_string()));
    }

    let encoded = data
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| Report::NoContent(data.to_string()))?;

    // GitHub wraps the payload every 60 characters.
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| Report::Decode(e.to_string()))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
