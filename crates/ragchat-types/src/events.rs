use serde::{Deserialize, Serialize};

use crate::message::Citation;

/// Typed event decoded from one frame of the chat stream
///
/// Events are transient: each one is applied to exactly one assistant message
/// and then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Fragment of answer text, appended to the message content
    Text {
        delta: String,
    },

    /// Fragment of reasoning trace, appended to `extra.reasoning`
    Reasoning {
        delta: String,
    },

    /// Complete citation snapshot, replacing `extra.citations`
    Citation {
        chunks: Vec<Citation>,
    },

    /// The answer is complete
    Finish {
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
        /// Canonical id assigned by the server to the assistant message
        #[serde(skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },

    /// Server-signaled failure mid-stream
    Error {
        message: String,
    },
}

impl StreamEvent {
    pub fn text(delta: impl Into<String>) -> Self {
        Self::Text { delta: delta.into() }
    }

    pub fn reasoning(delta: impl Into<String>) -> Self {
        Self::Reasoning { delta: delta.into() }
    }

    pub fn finish() -> Self {
        Self::Finish {
            usage: None,
            finish_reason: None,
            message_id: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }

    /// Whether this event moves a message into a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finish { .. } | Self::Error { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default, alias = "input_tokens")]
    pub prompt_tokens: u32,
    #[serde(default, alias = "output_tokens")]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(StreamEvent::finish().is_terminal());
        assert!(StreamEvent::error("boom").is_terminal());
        assert!(!StreamEvent::text("a").is_terminal());
        assert!(!StreamEvent::reasoning("a").is_terminal());
    }

    #[test]
    fn test_token_usage_accepts_openai_style_names() {
        let json = r#"{"input_tokens":12,"output_tokens":30,"total_tokens":42}"#;
        let usage: TokenUsage = serde_json::from_str(json).unwrap();

        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.completion_tokens, 30);
        assert_eq!(usage.total_tokens, 42);
    }

    #[test]
    fn test_event_serialization_tag() {
        let json = serde_json::to_string(&StreamEvent::text("Hi")).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(json.contains("\"delta\":\"Hi\""));
    }
}
