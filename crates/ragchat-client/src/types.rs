use ragchat_types::{Conversation, HybridStrategy, Message, RetrievalMode};
use serde::{Deserialize, Serialize};

/// Wire shape of `chat_retrieve_config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRetrieveConfig {
    pub retrieval_mode: RetrievalMode,
    pub top_k: u32,
    pub score_threshold: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid_strategy_type: Option<HybridStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_vector_weight: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_keyword_weight: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_model_id: Option<String>,
}

/// Body of `POST /chat/new`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConversationRequest {
    pub chat_model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub knowledge_base_ids: Vec<String>,
    pub temperature: f32,
    pub chat_retrieve_config: ChatRetrieveConfig,
}

/// Body of `POST /chat/sse`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub conversation_id: String,
    pub message: String,
    pub chat_model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub temperature: f32,
    pub knowledge_base_ids: Vec<String>,
    pub chat_retrieve_config: ChatRetrieveConfig,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewConversationResponse {
    pub conversation_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameConversationRequest<'a> {
    pub title: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

pub(crate) type ConversationList = ListResponse<Conversation>;
pub(crate) type MessageList = ListResponse<Message>;
