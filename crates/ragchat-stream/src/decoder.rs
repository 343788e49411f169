use ragchat_types::{Citation, StreamEvent, TokenUsage};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, StreamError};

/// Prefix carried by every frame line
pub const DATA_PREFIX: &str = "data: ";

/// Payload that closes the logical stream
pub const DONE_MARKER: &str = "[DONE]";

/// Strategy for turning one frame payload into a typed event
pub trait FrameDecoder: Send + Sync {
    /// Decode the payload that follows the frame prefix
    ///
    /// `Ok(None)` means the payload is well-formed but carries nothing to
    /// apply (e.g. an unknown frame type). `Err` means it is malformed.
    fn decode_payload(&self, data: &str) -> Result<Option<StreamEvent>>;

    /// Check if this payload is the end-of-stream sentinel
    fn is_done_marker(&self, data: &str) -> bool {
        data.trim() == DONE_MARKER
    }
}

/// Decode one line into an event, swallowing every decode-level failure
///
/// Non-frame lines, the `[DONE]` sentinel, unknown types and malformed
/// payloads all yield `None`. Malformed payloads are logged and skipped;
/// they never end the stream.
pub fn decode_line<D: FrameDecoder + ?Sized>(decoder: &D, line: &str) -> Option<StreamEvent> {
    let data = line.strip_prefix(DATA_PREFIX)?;

    if decoder.is_done_marker(data) {
        tracing::debug!("Received end-of-stream marker");
        return None;
    }

    match decoder.decode_payload(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed frame");
            None
        }
    }
}

const FRAME_TYPES: [&str; 5] = ["text", "reasoning", "citation", "finish", "error"];

/// Wire shape of the chat endpoint's JSON payloads
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatFrame {
    Text {
        content: String,
    },
    Reasoning {
        reasoning_content: String,
    },
    Citation {
        #[serde(default)]
        retrieval_docs: Vec<Citation>,
    },
    Finish {
        #[serde(default)]
        token_usage: Option<TokenUsage>,
        #[serde(default)]
        finish_reason: Option<String>,
        #[serde(default)]
        message_id: Option<String>,
    },
    Error {
        #[serde(default)]
        error_msg: Option<String>,
    },
}

impl From<ChatFrame> for StreamEvent {
    fn from(frame: ChatFrame) -> Self {
        match frame {
            ChatFrame::Text { content } => StreamEvent::Text { delta: content },
            ChatFrame::Reasoning { reasoning_content } => StreamEvent::Reasoning {
                delta: reasoning_content,
            },
            ChatFrame::Citation { retrieval_docs } => StreamEvent::Citation {
                chunks: retrieval_docs,
            },
            ChatFrame::Finish {
                token_usage,
                finish_reason,
                message_id,
            } => StreamEvent::Finish {
                usage: token_usage,
                finish_reason,
                message_id,
            },
            ChatFrame::Error { error_msg } => StreamEvent::Error {
                message: error_msg.unwrap_or_else(|| "Unknown error".to_string()),
            },
        }
    }
}

/// Decoder for the `/chat/sse` payload schema
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatFrameDecoder;

impl FrameDecoder for ChatFrameDecoder {
    fn decode_payload(&self, data: &str) -> Result<Option<StreamEvent>> {
        let value: Value = serde_json::from_str(data)
            .map_err(|e| StreamError::MalformedFrame(format!("invalid JSON: {}", e)))?;

        let frame_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| StreamError::MalformedFrame("missing `type` field".to_string()))?;

        if !FRAME_TYPES.contains(&frame_type) {
            tracing::debug!(frame_type, "Ignoring frame of unknown type");
            return Ok(None);
        }

        let frame: ChatFrame = serde_json::from_value(value)
            .map_err(|e| StreamError::MalformedFrame(e.to_string()))?;

        Ok(Some(frame.into()))
    }
}
