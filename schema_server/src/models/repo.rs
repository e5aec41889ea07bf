//! Tracked repository identity and commit references.

use serde::{Deserialize, Serialize};

/// The one repository and file path this automation watches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaLocation {
    /// Web base URL, used for links and as the fingerprint provider.
    pub base_url: String,
    /// REST API base URL.
    pub api_url: String,
    pub owner: String,
    pub name: String,
    pub path: String,
}

impl SchemaLocation {
    /// Is this event about the tracked repository?
    pub fn matches(&self, owner: &str, name: &str) -> bool {
        self.owner == owner && self.name == name
    }

    /// The tracked file at a branch or commit.
    pub fn at(&self, git_ref: &str) -> RepoRef {
        RepoRef {
            owner: self.owner.clone(),
            name: self.name.clone(),
            git_ref: git_ref.to_string(),
        }
    }

    /// Browser link to the schema file at a ref.
    pub fn link(&self, git_ref: &str) -> String {
        format!(
            "{}/{}/{}/tree/{}/{}",
            self.base_url, self.owner, self.name, git_ref, self.path
        )
    }

    /// Contents API URL for the schema file. The ref travels separately as
    /// the `ref` query parameter.
    pub fn contents_url(&self, repo_ref: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url.trim_end_matches('/'),
            repo_ref.owner,
            repo_ref.name,
            self.path,
        )
    }
}

/// A location of the tracked file: owner/name plus a branch name or commit SHA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// Repository identity as carried by push and impact events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoIdentity {
    pub owner: String,
    pub name: String,
    pub default_branch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> SchemaLocation {
        SchemaLocation {
            base_url: "https://www.github.com".to_string(),
            api_url: "https://api.github.com/".to_string(),
            owner: "atomisthq".to_string(),
            name: "neo4j-ingester".to_string(),
            path: "resources/schema.idl".to_string(),
        }
    }

    #[test]
    fn link_points_at_tree() {
        assert_eq!(
            location().link("abc123"),
            "https://www.github.com/atomisthq/neo4j-ingester/tree/abc123/resources/schema.idl"
        );
    }

    #[test]
    fn contents_url_names_repo_and_path() {
        let loc = location();
        assert_eq!(
            loc.contents_url(&loc.at("feat#1")),
            "https://api.github.com/repos/atomisthq/neo4j-ingester/contents/resources/schema.idl"
        );
    }

    #[test]
    fn matches_owner_and_name_only() {
        let loc = location();
        assert!(loc.matches("atomisthq", "neo4j-ingester"));
        assert!(!loc.matches("atomisthq", "other"));
        assert!(!loc.matches("someone", "neo4j-ingester"));
    }
}
