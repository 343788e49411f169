use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::TokenUsage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Structured,
}

/// One retrieved chunk backing an answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default, alias = "chunk_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "doc_id", skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, alias = "doc_name", skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, alias = "similarity", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Backend-specific fields kept verbatim
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Side data of a message rendered apart from its main content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageExtra {
    #[serde(default, alias = "reasoning_content", skip_serializing_if = "String::is_empty")]
    pub reasoning: String,
    #[serde(default, alias = "retrieval_docs", skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, rename = "isError", alias = "is_error")]
    pub is_error: bool,
    #[serde(default, rename = "errorMsg", alias = "error_msg", skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    #[serde(default, alias = "token_usage", skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Position within the conversation, starting at 1
    #[serde(default)]
    pub seq: u64,
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub extra: MessageExtra,
}

impl Message {
    fn new(role: MessageRole, conversation_id: Option<String>, seq: u64, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id,
            seq,
            role,
            content,
            message_type: MessageType::Text,
            created_at: Utc::now(),
            extra: MessageExtra::default(),
        }
    }

    /// User message with a provisional client-side id
    pub fn user(conversation_id: Option<String>, seq: u64, content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, conversation_id, seq, content.into())
    }

    /// Empty assistant message that streamed events are folded into
    pub fn assistant_placeholder(conversation_id: Option<String>, seq: u64) -> Self {
        Self::new(MessageRole::Assistant, conversation_id, seq, String::new())
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisional_ids_are_unique() {
        let a = Message::user(None, 1, "hi");
        let b = Message::user(None, 1, "hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_placeholder_is_empty_assistant() {
        let msg = Message::assistant_placeholder(Some("c1".into()), 2);

        assert!(msg.is_assistant());
        assert!(msg.content.is_empty());
        assert_eq!(msg.seq, 2);
        assert_eq!(msg.extra, MessageExtra::default());
    }

    #[test]
    fn test_server_message_with_snake_case_extra() {
        let json = r#"{
            "id": "m-1",
            "conversation_id": "c-1",
            "seq": 3,
            "role": "assistant",
            "content": "Answer",
            "type": "text",
            "extra": {
                "reasoning_content": "thinking",
                "retrieval_docs": [{"doc_id": "d1", "doc_name": "guide.pdf", "similarity": 0.82, "page": 4}],
                "error_msg": null
            }
        }"#;

        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.extra.reasoning, "thinking");
        assert_eq!(msg.extra.citations.len(), 1);

        let citation = &msg.extra.citations[0];
        assert_eq!(citation.document_id.as_deref(), Some("d1"));
        assert_eq!(citation.document_name.as_deref(), Some("guide.pdf"));
        assert_eq!(citation.score, Some(0.82));
        assert_eq!(citation.other.get("page"), Some(&serde_json::json!(4)));
    }

    #[test]
    fn test_error_flag_serializes_camel_case() {
        let mut msg = Message::assistant_placeholder(None, 1);
        msg.extra.is_error = true;
        msg.extra.error_msg = Some("quota".to_string());

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["extra"]["isError"], serde_json::json!(true));
        assert_eq!(json["extra"]["errorMsg"], serde_json::json!("quota"));
    }
}
