//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use ragchat::prelude::*;
//! ```

pub use crate::{
    ChatBackend, ChatModelConfig, ClientConfig, ClientFactory, ConversationSession,
    HttpChatBackend, HybridStrategy, Message, MessageRole, RetrievalMode, SessionError,
    SessionUpdate, StreamEvent, StreamHandle, StreamOutcome,
};
