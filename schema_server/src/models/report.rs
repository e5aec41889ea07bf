//! Failure reports and handler outcomes.

use serde::Serialize;

/// Why an externally-facing operation failed. The `Display` text is the
/// error message relayed to chat.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Report {
    /// The contents API call itself failed (network, auth, not found).
    #[error("{0}")]
    Api(String),
    #[error("No data in result: {0}")]
    NoData(String),
    #[error("No content in result data: {0}")]
    NoContent(String),
    #[error("Content is not valid base64: {0}")]
    Decode(String),
    #[error("Failure posting fingerprint.\nError: {error},\nResponse body: {body}\nURL: {url}\nData: {data}")]
    Publish {
        error: String,
        body: String,
        url: String,
        data: String,
    },
    #[error("Failure posting to {url}: {reason}\nResponse body: {body}")]
    Deploy {
        url: String,
        reason: String,
        body: String,
    },
}

/// What a handler invocation came to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HandlerResult {
    /// The event did not concern us. Neutral, never an error.
    Skipped { reason: String },
    Succeeded { message: String },
    Failed { message: String },
}

impl HandlerResult {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn succeeded(message: impl Into<String>) -> Self {
        Self::Succeeded {
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Non-zero only for real failures.
    pub fn code(&self) -> i32 {
        match self {
            Self::Skipped { .. } | Self::Succeeded { .. } => 0,
            Self::Failed { .. } => 1,
        }
    }
}

/// JSON response for a handler invocation.
#[derive(Debug, Serialize)]
pub struct HandlerResultJson {
    pub code: i32,
    #[serde(flatten)]
    pub result: HandlerResult,
}

impl From<HandlerResult> for HandlerResultJson {
    fn from(result: HandlerResult) -> Self {
        Self {
            code: result.code(),
            result,
        }
    }
}
