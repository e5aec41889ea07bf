//! Chat messages: plain text plus legacy Slack attachments carrying buttons.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message as posted to `chat.postMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl SlackMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub fallback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// An interactive button. `value` holds the serialized [`CommandBinding`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// The command a button runs, with its bound parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandBinding {
    pub command: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Build a button that invokes `command` with `parameters` when clicked.
pub fn button_for_command(text: &str, command: &str, parameters: Map<String, Value>) -> Action {
    let binding = CommandBinding {
        command: command.to_string(),
        parameters,
    };
    Action {
        name: command.to_string(),
        text: text.to_string(),
        kind: "button".to_string(),
        // A map of strings always serializes.
        value: serde_json::to_string(&binding).unwrap_or_default(),
    }
}

/// `<url|label>` link markup.
pub fn url(link: &str, label: &str) -> String {
    format!("<{link}|{label}>")
}

/// `<@user>` mention markup.
pub fn user(id: &str) -> String {
    format!("<@{id}>")
}
