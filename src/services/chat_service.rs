//! Scout configuration chat: user messages go to the completion endpoint,
//! structured updates embedded in the reply are applied to the scout.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::api::types::MessageDto;
use crate::domain::UserLocation;

#[derive(Debug, Error)]
pub enum ChatServiceError {
    #[error("Scout not found or unauthorized")]
    NotOwner,

    #[error("Chat backend error: {0}")]
    Backend(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ChatServiceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Structured update the assistant can embed in a reply as a fenced
/// ```json block tagged `"scout_update"`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScoutUpdatePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub search_queries: Option<Vec<String>>,
    pub location: Option<UserLocation>,
    pub frequency: Option<String>,
}

#[async_trait::async_trait]
pub trait ChatService: Send + Sync {
    async fn list_messages(
        &self,
        user_id: &str,
        scout_id: &str,
    ) -> Result<Vec<MessageDto>, ChatServiceError>;

    /// Stores the user message, obtains the assistant reply, applies any
    /// embedded update to the scout, and returns the full conversation.
    async fn send_message(
        &self,
        user_id: &str,
        scout_id: &str,
        content: &str,
    ) -> Result<Vec<MessageDto>, ChatServiceError>;
}

static UPDATE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("update block pattern is valid")
});

#[derive(Deserialize)]
struct TaggedUpdate {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    payload: ScoutUpdatePayload,
}

/// Extracts a `scout_update` block from an assistant reply. Returns the
/// reply with the block removed, plus the parsed payload when one was
/// present and well-formed. Malformed blocks are left in place untouched.
#[must_use]
pub fn extract_scout_update(reply: &str) -> (String, Option<ScoutUpdatePayload>) {
    for captures in UPDATE_BLOCK.captures_iter(reply) {
        let raw = &captures[1];
        let Ok(update) = serde_json::from_str::<TaggedUpdate>(raw) else {
            continue;
        };
        if update.kind != "scout_update" {
            continue;
        }

        let whole = captures.get(0).expect("capture 0 always exists");
        let mut cleaned = String::with_capacity(reply.len());
        cleaned.push_str(&reply[..whole.start()]);
        cleaned.push_str(&reply[whole.end()..]);
        return (cleaned.trim().to_string(), Some(update.payload));
    }

    (reply.trim().to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tagged_update_and_strips_block() {
        let reply = concat!(
            "Got it, I'll watch for Rust jobs.\n\n",
            "```json\n",
            r#"{"type": "scout_update", "title": "Rust jobs", "search_queries": ["rust jobs berlin"]}"#,
            "\n```\n",
            "Anything else?"
        );

        let (cleaned, update) = extract_scout_update(reply);
        let update = update.unwrap();

        assert_eq!(update.title.as_deref(), Some("Rust jobs"));
        assert_eq!(
            update.search_queries,
            Some(vec!["rust jobs berlin".to_string()])
        );
        assert!(!cleaned.contains("```"));
        assert!(cleaned.starts_with("Got it"));
        assert!(cleaned.ends_with("Anything else?"));
    }

    #[test]
    fn ignores_json_blocks_without_the_tag() {
        let reply = "Here is an example:\n```json\n{\"foo\": 1}\n```";
        let (cleaned, update) = extract_scout_update(reply);
        assert!(update.is_none());
        assert_eq!(cleaned, reply.trim());
    }

    #[test]
    fn malformed_json_is_left_alone() {
        let reply = "```json\n{\"type\": \"scout_update\", broken\n```";
        let (_, update) = extract_scout_update(reply);
        assert!(update.is_none());
    }

    #[test]
    fn plain_replies_pass_through() {
        let (cleaned, update) = extract_scout_update("Just words.");
        assert_eq!(cleaned, "Just words.");
        assert!(update.is_none());
    }
}
