//! # Ragchat
//!
//! Streaming client for retrieval-augmented chat services.
//!
//! ## Overview
//!
//! Ragchat talks to a chat backend that answers questions against knowledge
//! bases and streams its answers as server-sent events. It:
//!
//! - **Composes requests** from a model and retrieval configuration
//! - **Decodes streams** into typed events, tolerating arbitrary chunking
//! - **Accumulates answers** into assistant messages, text and reasoning apart
//! - **Manages conversations** with a single writer per message list
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ragchat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = ClientFactory::create_backend(
//!         ClientConfig::new("https://rag.example.com/api/v1")
//!             .with_api_token(std::env::var("RAGCHAT_API_TOKEN")?),
//!     )?;
//!     let session = ConversationSession::new(backend);
//!
//!     let config = ChatModelConfig::new("qwen-max").with_knowledge_bases(["kb-handbook"]);
//!     let mut handle = session.send("How many vacation days do I get?", &config).await?;
//!
//!     while let Some(update) = handle.next_update().await {
//!         match update {
//!             SessionUpdate::MessageUpdated(message) => println!("{}", message.content),
//!             SessionUpdate::Notice(notice) => eprintln!("{}", notice),
//!             SessionUpdate::Finished(outcome) => println!("{:?}", outcome),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`ragchat-types`**: messages, conversations, stream events and chat configuration
//! - **`ragchat-stream`**: frame reader and event decoder for `data:` streams
//! - **`ragchat-client`**: request composer and the HTTP backend
//! - **`ragchat-session`**: message accumulator and conversation session manager
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use ragchat_types::{
    ChatModelConfig, Citation, Conversation, HybridStrategy, Message, MessageExtra, MessageRole,
    MessageType, RetrievalMode, StreamEvent, TokenUsage,
};

pub use ragchat_stream::{
    parse_event_stream, read_lines, ChatFrameDecoder, FrameDecoder, LineBuffer, StreamError,
};

pub use ragchat_client::{
    compose, compose_new_conversation, ChatBackend, ChatRequest, ChatRetrieveConfig, ClientConfig,
    ClientError, ClientFactory, HttpChatBackend, NewConversationRequest,
};

pub use ragchat_session::{
    AccumulatorState, Applied, ConversationSession, MessageAccumulator, SessionError,
    SessionUpdate, StreamHandle, StreamOutcome,
};
