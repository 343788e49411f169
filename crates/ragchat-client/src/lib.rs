pub mod composer;
pub mod config;
pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use composer::{
    compose, compose_new_conversation, DEFAULT_SCORE_THRESHOLD, DEFAULT_TEMPERATURE, DEFAULT_TOP_K,
};
pub use config::{ClientConfig, ClientFactory};
pub use error::{ClientError, Result};
pub use http::{HttpChatBackend, HttpChatBackendBuilder};
pub use traits::{ByteStream, ChatBackend};
pub use types::{ChatRequest, ChatRetrieveConfig, NewConversationRequest};
