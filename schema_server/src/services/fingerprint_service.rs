//! Schema fingerprints: compute them and report them to the fingerprint service.
//!
//! The fingerprint service keeps the history per commit and emits impact
//! events when two commits of a push disagree.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::events::impact::SCHEMA_FINGERPRINT;
use crate::models::repo::SchemaLocation;
use crate::models::report::Report;

/// SHA-256 of the exact schema text, as 64 lowercase hex characters.
///
/// Whitespace is not normalized, so reformatting the schema counts as a change.
pub fn calculate_fingerprint(idl: &str) -> String {
    hex::encode(Sha256::digest(idl.as_bytes()))
}

#[derive(Debug, Serialize)]
struct FingerprintPayload<'a> {
    commit: CommitJson<'a>,
    fingerprints: [FingerprintJson<'a>; 1],
}

#[derive(Debug, Serialize)]
struct CommitJson<'a> {
    provider: &'a str,
    owner: &'a str,
    repo: &'a str,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct FingerprintJson<'a> {
    name: &'a str,
    sha: &'a str,
}

/// POST a fingerprint for `git_ref` to `<webhook_url>/fingerprints/teams/<team_id>`.
///
/// Returns the fingerprint unchanged once the service has accepted it.
pub async fn push_fingerprint(
    client: &reqwest::Client,
    webhook_url: &str,
    location: &SchemaLocation,
    team_id: &str,
    git_ref: &str,
    fingerprint: &str,
) -> Result<String, Report> {
    let url = format!(
        "{}/fingerprints/teams/{}",
        webhook_url.trim_end_matches('/'),
        team_id
    );
    let payload = FingerprintPayload {
        commit: CommitJson {
            provider: &location.base_url,
            owner: &location.owner,
            repo: &location.name,
            sha: git_ref,
        },
        fingerprints: [FingerprintJson {
            name: SCHEMA_FINGERPRINT,
            sha: fingerprint,
        }],
    };
    let data = serde_json::to_string(&payload).unwrap_or_default();

    tracing::info!(url = %url, data = %data, "Sending fingerprint");

    let failure = |error: String, body: Option<String>| {
        crate::metrics::fingerprint_published("failure");
        Report::Publish {
            error,
            body: body.unwrap_or_else(|| "(none)".to_string()),
            url: url.clone(),
            data: data.clone(),
        }
    };

    let resp = client
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| failure(e.to_string(), None))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.ok().filter(|b| !b.is_empty());
        return Err(failure(status.to_string(), body));
    }

    crate::metrics::fingerprint_published("success");
    Ok(fingerprint.to_string())
}
