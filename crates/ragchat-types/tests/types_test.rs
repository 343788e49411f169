use ragchat_types::{Citation, Message, MessageRole, StreamEvent, TokenUsage};

#[test]
fn test_stream_event_finish_with_usage() {
    let event = StreamEvent::Finish {
        usage: Some(TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        finish_reason: Some("stop".to_string()),
        message_id: None,
    };

    match event {
        StreamEvent::Finish { usage, finish_reason, .. } => {
            assert_eq!(usage.map(|u| u.total_tokens), Some(15));
            assert_eq!(finish_reason, Some("stop".to_string()));
        }
        _ => panic!("Expected Finish variant"),
    }
}

#[test]
fn test_stream_event_citation_deserialization() {
    let json = r#"{"type":"citation","chunks":[{"id":"k1","content":"Refunds take 5 days"}]}"#;
    let event: StreamEvent = serde_json::from_str(json).unwrap();

    match event {
        StreamEvent::Citation { chunks } => {
            assert_eq!(chunks.len(), 1);
            assert_eq!(chunks[0].id.as_deref(), Some("k1"));
        }
        _ => panic!("Expected Citation variant"),
    }
}

#[test]
fn test_finish_serialization_skips_missing_fields() {
    let json = serde_json::to_string(&StreamEvent::finish()).unwrap();
    assert_eq!(json, r#"{"type":"finish"}"#);
}

#[test]
fn test_message_roles_serialize_lowercase() {
    let msg = Message::user(Some("c1".to_string()), 1, "Hello");
    let json = serde_json::to_value(&msg).unwrap();

    assert_eq!(json["role"], "user");
    assert_eq!(json["type"], "text");
    assert_eq!(msg.role, MessageRole::User);
}

#[test]
fn test_citation_roundtrip_keeps_unknown_fields() {
    let json = r#"{"chunk_id":"k2","doc_name":"faq.md","positions":[[1,2]]}"#;
    let citation: Citation = serde_json::from_str(json).unwrap();

    let back = serde_json::to_value(&citation).unwrap();
    assert_eq!(back["id"], "k2");
    assert_eq!(back["document_name"], "faq.md");
    assert_eq!(back["positions"], serde_json::json!([[1, 2]]));
}
