use async_trait::async_trait;
use futures::Stream;
use ragchat_types::{Conversation, Message};
use std::pin::Pin;

use crate::error::Result;
use crate::types::{ChatRequest, NewConversationRequest};

/// Raw response body of the chat endpoint, chunked as it arrives
///
/// Dropping the stream closes the underlying connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Transport boundary to the chat backend
///
/// Bearer authentication and HTTP status handling live behind this trait;
/// callers only see typed results.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Create a conversation and return its server-assigned id
    async fn create_conversation(&self, request: NewConversationRequest) -> Result<String>;

    /// Send a chat message and open its event stream
    async fn open_chat_stream(&self, request: ChatRequest) -> Result<ByteStream>;

    /// List conversations, newest first, one page at a time
    async fn list_conversations(&self, page: u32, page_size: u32) -> Result<Vec<Conversation>>;

    /// Full message history of a conversation
    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;

    async fn delete_conversation(&self, conversation_id: &str) -> Result<()>;

    async fn rename_conversation(&self, conversation_id: &str, title: &str) -> Result<()>;
}
