//! Push events.

use serde::{Deserialize, Serialize};

use crate::models::repo::RepoIdentity;

/// A push to some repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub repo: RepoIdentity,
    pub branch: String,
    pub after_sha: String,
    /// Absent on the first push of a branch.
    #[serde(default)]
    pub before_sha: Option<String>,
}

impl PushEvent {
    /// Convert a GitHub `push` webhook payload. Returns `None` for pushes
    /// that are not branch updates (tags, deletions).
    pub fn from_github(payload: &serde_json::Value) -> Option<Self> {
        let repository = &payload["repository"];
        let owner = repository["owner"]["login"]
            .as_str()
            .or_else(|| repository["owner"]["name"].as_str())?;
        let name = repository["name"].as_str()?;
        let default_branch = repository["default_branch"].as_str().unwrap_or("master");

        let branch = payload["ref"].as_str()?.strip_prefix("refs/heads/")?;
        let after_sha = payload["after"].as_str().filter(|s| !is_null_sha(s))?;
        let before_sha = payload["before"]
            .as_str()
            .filter(|s| !is_null_sha(s))
            .map(str::to_string);

        Some(Self {
            repo: RepoIdentity {
                owner: owner.to_string(),
                name: name.to_string(),
                default_branch: default_branch.to_string(),
            },
            branch: branch.to_string(),
            after_sha: after_sha.to_string(),
            before_sha,
        })
    }
}

/// GitHub reports a missing commit as forty zeros.
fn is_null_sha(sha: &str) -> bool {
    sha.is_empty() || sha.chars().all(|c| c == '0')
}
