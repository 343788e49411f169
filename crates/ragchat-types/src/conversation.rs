use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation as listed by the backend
///
/// A conversation only exists server-side once the first message of a new
/// chat has been sent; before that the session holds no id at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(alias = "conversation_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "update_time", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Ordered ids of the messages in this conversation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_ids: Vec<String>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            updated_at: None,
            message_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_entry_deserialization() {
        let json = r#"{"conversation_id":"c-9","title":"Pricing","updated_at":"2024-05-01T10:00:00Z"}"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();

        assert_eq!(conv.id, "c-9");
        assert_eq!(conv.title, "Pricing");
        assert!(conv.updated_at.is_some());
        assert!(conv.message_ids.is_empty());
    }
}
