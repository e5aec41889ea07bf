//! Deploy targets and requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Database a schema can be deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Staging,
    Production,
}

impl Environment {
    /// Pushes to the default branch go to production, everything else to staging.
    pub fn for_branch(is_default_branch: bool) -> Self {
        if is_default_branch {
            Environment::Production
        } else {
            Environment::Staging
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved request to deploy the schema at `git_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub git_ref: String,
    pub environment: Environment,
    pub invoking_user: String,
    pub ref_description: String,
}
