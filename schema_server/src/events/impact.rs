//! Impact events: the fingerprint service saw artifacts change in a push.

use serde::{Deserialize, Serialize};

use crate::models::repo::RepoIdentity;

/// Fingerprint name the schema is reported under.
pub const SCHEMA_FINGERPRINT: &str = "graphql-schema";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactEvent {
    pub repo: RepoIdentity,
    pub branch: String,
    pub after_sha: String,
    /// `(fingerprint name, magnitude)` pairs, serialized as two-element arrays.
    #[serde(default)]
    pub changed: Vec<(String, i64)>,
}

impl ImpactEvent {
    /// Did the push change the named artifact?
    pub fn changed(&self, artifact: &str) -> bool {
        self.changed
            .iter()
            .any(|(name, magnitude)| name == artifact && *magnitude != 0)
    }

    pub fn on_default_branch(&self) -> bool {
        self.branch == self.repo.default_branch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn impact(changed: serde_json::Value) -> ImpactEvent {
        serde_json::from_value(json!({
            "repo": { "owner": "atomisthq", "name": "neo4j-ingester", "default_branch": "master" },
            "branch": "master",
            "after_sha": "abc123",
            "changed": changed
        }))
        .unwrap()
    }

    #[test]
    fn zero_magnitude_is_not_a_change() {
        assert!(!impact(json!([["graphql-schema", 0]])).changed(SCHEMA_FINGERPRINT));
    }

    #[test]
    fn nonzero_magnitude_is_a_change() {
        let event = impact(json!([["readme", 1], ["graphql-schema", 3]]));
        assert!(event.changed(SCHEMA_FINGERPRINT));
        assert!(event.on_default_branch());
    }

    #[test]
    fn other_artifacts_do_not_count() {
        assert!(!impact(json!([["readme", 5]])).changed(SCHEMA_FINGERPRINT));
    }
}
