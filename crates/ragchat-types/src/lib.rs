pub mod config;
pub mod conversation;
pub mod events;
pub mod message;

pub use config::{ChatModelConfig, HybridStrategy, RetrievalMode};
pub use conversation::Conversation;
pub use events::{StreamEvent, TokenUsage};
pub use message::{Citation, Message, MessageExtra, MessageRole, MessageType};
