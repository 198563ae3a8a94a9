//! Ingress from the auto-save collaborator (§6)
//!
//! A shell-hook subsystem, external to this crate, forwards conversation
//! transcripts. This module owns the message shape it hands over, the
//! tool-result filtering rule, and the project-slug derivation used to bind
//! an incoming message to a [`mnemolite_domain::entities::Project`] before
//! it reaches [`mnemolite_application::MemoryCore::insert_event`].
//!
//! Project slug derivation itself lives on `MemoryCore::resolve_project`
//! (§4.4 already owns that operation); this module only shapes the raw
//! ingress payload and decides which messages are eligible to become
//! events at all.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of the message within its transcript (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Authored by the human operator.
    User,
    /// Authored by the assistant.
    Assistant,
}

/// One block of a message's content, tagged by shape. A message's content
/// is an array of these; a block tagged `ToolResult` anywhere in that array
/// disqualifies the whole message from the `user` role (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain prose.
    Text {
        /// The block's text.
        text: String,
    },
    /// A structured, non-text payload (e.g. a tool call's arguments).
    Structured {
        /// Arbitrary structured content.
        value: Value,
    },
    /// The result of a tool invocation; never eligible for the `user` role.
    ToolResult {
        /// The invoked tool's name, when known.
        tool_name: Option<String>,
        /// The tool's output.
        value: Value,
    },
}

impl ContentBlock {
    /// Whether this block is a tool-result block.
    #[must_use]
    pub fn is_tool_result(&self) -> bool {
        matches!(self, ContentBlock::ToolResult { .. })
    }
}

/// A raw ingress message as forwarded by the shell-hook subsystem: fields
/// `(transcript_path, session_id, project_origin, message_kind, content)`
/// per §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngressMessage {
    /// Path to the transcript file this message was extracted from.
    pub transcript_path: String,
    /// Session identifier grouping messages from one conversation.
    pub session_id: String,
    /// The origin path used to resolve a project slug (§6).
    pub project_origin: String,
    /// Author role.
    pub message_kind: MessageKind,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
}

impl IngressMessage {
    /// Whether this message contains a tool-result block anywhere in its
    /// content array. Tool-result messages MUST be filtered out from the
    /// `user` role (§6); assistant-authored tool results are unaffected.
    #[must_use]
    pub fn is_tool_result_message(&self) -> bool {
        self.content.iter().any(ContentBlock::is_tool_result)
    }

    /// Whether this message is eligible to become a persisted event: every
    /// `assistant` message is eligible, and every `user` message is
    /// eligible unless it carries a tool-result block (§6).
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        match self.message_kind {
            MessageKind::Assistant => true,
            MessageKind::User => !self.is_tool_result_message(),
        }
    }

    /// Concatenate this message's text blocks into a single payload string,
    /// for messages with no non-text content worth preserving structurally.
    #[must_use]
    pub fn text_payload(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Filter a batch of raw ingress messages down to the ones eligible to
/// become events, per [`IngressMessage::is_eligible`].
#[must_use]
pub fn filter_eligible(messages: Vec<IngressMessage>) -> Vec<IngressMessage> {
    messages.into_iter().filter(IngressMessage::is_eligible).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(kind: MessageKind, text: &str) -> IngressMessage {
        IngressMessage {
            transcript_path: "/tmp/transcript.jsonl".to_string(),
            session_id: "sess-1".to_string(),
            project_origin: "/home/dev/myproject".to_string(),
            message_kind: kind,
            content: vec![ContentBlock::Text { text: text.to_string() }],
        }
    }

    #[test]
    fn plain_user_text_is_eligible() {
        let msg = text_message(MessageKind::User, "hello");
        assert!(msg.is_eligible());
        assert!(!msg.is_tool_result_message());
    }

    #[test]
    fn user_message_with_tool_result_is_filtered_out() {
        let mut msg = text_message(MessageKind::User, "see result:");
        msg.content.push(ContentBlock::ToolResult {
            tool_name: Some("search_code".to_string()),
            value: serde_json::json!({"results": []}),
        });
        assert!(msg.is_tool_result_message());
        assert!(!msg.is_eligible());
    }

    #[test]
    fn assistant_message_with_tool_result_stays_eligible() {
        let mut msg = text_message(MessageKind::Assistant, "ran a tool:");
        msg.content.push(ContentBlock::ToolResult {
            tool_name: Some("search_code".to_string()),
            value: serde_json::json!({"results": []}),
        });
        assert!(msg.is_eligible());
    }

    #[test]
    fn filter_eligible_drops_only_tool_result_user_messages() {
        let mut tool_result_user = text_message(MessageKind::User, "see result:");
        tool_result_user.content.push(ContentBlock::ToolResult {
            tool_name: None,
            value: Value::Null,
        });
        let messages = vec![
            text_message(MessageKind::User, "a"),
            tool_result_user,
            text_message(MessageKind::Assistant, "b"),
        ];

        let eligible = filter_eligible(messages);
        assert_eq!(eligible.len(), 2);
    }

    #[test]
    fn text_payload_joins_only_text_blocks() {
        let mut msg = text_message(MessageKind::User, "line one");
        msg.content.push(ContentBlock::Structured { value: serde_json::json!({"a": 1}) });
        assert_eq!(msg.text_payload(), "line one");
    }
}
