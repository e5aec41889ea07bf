//! Registration table: which handler answers which command or event.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::handlers::push_schema_to_neo;

/// How a handler is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Trigger {
    /// A chat command, matched on its leading phrase.
    Intent(&'static str),
    /// An event subscription.
    Subscription(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    HelloWorld,
    PushSchemaToNeo,
    NoticeSchemaChange,
    SuggestSchemaDeploy,
}

#[derive(Debug, Serialize)]
pub struct Registration {
    pub name: &'static str,
    pub description: &'static str,
    pub trigger: Trigger,
    pub tags: &'static [&'static str],
    #[serde(skip)]
    pub kind: HandlerKind,
}

pub static REGISTRATIONS: [Registration; 4] = [
    Registration {
        name: "HelloWorld",
        description: "Sends a hello back to the invoking user",
        trigger: Trigger::Intent("hello automate-graphql-schema"),
        tags: &[],
        kind: HandlerKind::HelloWorld,
    },
    Registration {
        name: push_schema_to_neo::NAME,
        description: "Post a schema.idl to a Neo4j database",
        trigger: Trigger::Intent("deploy graphql schema"),
        tags: &["graphql"],
        kind: HandlerKind::PushSchemaToNeo,
    },
    Registration {
        name: "NoticeSchemaChange",
        description: "Add fingerprint on schema change",
        trigger: Trigger::Subscription("push"),
        tags: &["graphql"],
        kind: HandlerKind::NoticeSchemaChange,
    },
    Registration {
        name: "SuggestSchemaDeploy",
        description: "Supply deploy button on schema change",
        trigger: Trigger::Subscription("impact"),
        tags: &["graphql"],
        kind: HandlerKind::SuggestSchemaDeploy,
    },
];

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("{0} is an event handler, not a command")]
    NotACommand(String),
    #[error("No command matches: {0}")]
    NoMatchingIntent(String),
    #[error("Invalid parameters for {command}: {source}")]
    InvalidParameters {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Command registration by name.
pub fn command(name: &str) -> Option<&'static Registration> {
    REGISTRATIONS
        .iter()
        .find(|r| r.name == name && matches!(r.trigger, Trigger::Intent(_)))
}

/// Event registration by subscription name.
pub fn subscription(name: &str) -> Option<&'static Registration> {
    REGISTRATIONS
        .iter()
        .find(|r| matches!(r.trigger, Trigger::Subscription(s) if s == name))
}

/// Match chat text against command intents. Words after the intent of the
/// form `key=value` become parameters.
pub fn match_intent(text: &str) -> Result<(&'static Registration, Map<String, Value>), BindError> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let (registration, rest) = REGISTRATIONS
        .iter()
        .filter_map(|r| match r.trigger {
            Trigger::Intent(intent) => strip_intent(&normalized, intent).map(|rest| (r, rest)),
            Trigger::Subscription(_) => None,
        })
        .next()
        .ok_or_else(|| BindError::NoMatchingIntent(text.to_string()))?;

    let mut parameters = Map::new();
    for word in rest.split_whitespace() {
        match word.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                parameters.insert(key.to_string(), Value::from(value));
            }
            _ => tracing::debug!(word = %word, "Ignoring word without key=value"),
        }
    }

    Ok((registration, parameters))
}

/// The text after `intent`, if `text` starts with it as whole words.
fn strip_intent<'a>(text: &'a str, intent: &str) -> Option<&'a str> {
    let head = text.get(..intent.len())?;
    if !head.eq_ignore_ascii_case(intent) {
        return None;
    }
    let rest = &text[intent.len()..];
    if rest.is_empty() || rest.starts_with(' ') {
        Some(rest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_are_unique() {
        for (i, a) in REGISTRATIONS.iter().enumerate() {
            for b in &REGISTRATIONS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn lookups_respect_trigger_kind() {
        assert_eq!(command("PushSchemaToNeo").unwrap().kind, HandlerKind::PushSchemaToNeo);
        assert!(command("NoticeSchemaChange").is_none());
        assert_eq!(subscription("push").unwrap().kind, HandlerKind::NoticeSchemaChange);
        assert_eq!(subscription("impact").unwrap().kind, HandlerKind::SuggestSchemaDeploy);
        assert!(subscription("deploy graphql schema").is_none());
    }

    #[test]
    fn subscription_lookup_takes_borrowed_names() {
        let name = String::from("impact");
        assert_eq!(subscription(&name).unwrap().name, "SuggestSchemaDeploy");
        assert!(subscription(&format!("{name}s")).is_none());
    }

    #[test]
    fn intent_binds_parameters() {
        let (registration, params) =
            match_intent("deploy  graphql schema ref=abc123 database=production please").unwrap();
        assert_eq!(registration.kind, HandlerKind::PushSchemaToNeo);
        assert_eq!(params.get("ref"), Some(&json!("abc123")));
        assert_eq!(params.get("database"), Some(&json!("production")));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn bare_intent_has_no_parameters() {
        let (registration, params) = match_intent("hello automate-graphql-schema").unwrap();
        assert_eq!(registration.kind, HandlerKind::HelloWorld);
        assert!(params.is_empty());
    }

    #[test]
    fn intent_must_match_whole_words() {
        assert!(match_intent("deploy graphql schemas").is_err());
        assert!(match_intent("deploy").is_err());
        assert!(match_intent("").is_err());
    }

    #[test]
    fn table_serializes_without_kind() {
        let value = serde_json::to_value(command("HelloWorld").unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "HelloWorld",
                "description": "Sends a hello back to the invoking user",
                "trigger": { "type": "intent", "value": "hello automate-graphql-schema" },
                "tags": []
            })
        );
    }
}
