//! Request composition from a UI configuration snapshot
//!
//! Composition is pure: it never touches the network, so a configuration
//! error is always reported before any request is attempted.

use ragchat_types::{ChatModelConfig, HybridStrategy, RetrievalMode};
use std::ops::RangeInclusive;

use crate::error::{ClientError, Result};
use crate::types::{ChatRequest, ChatRetrieveConfig, NewConversationRequest};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_K: u32 = 10;
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;

const TOP_K_RANGE: RangeInclusive<u32> = 1..=100;
const UNIT_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Build the `/chat/sse` request for one user message
pub fn compose(conversation_id: &str, text: &str, config: &ChatModelConfig) -> Result<ChatRequest> {
    let chat_model_id = require_model(config)?;
    let chat_retrieve_config = compose_retrieve_config(config)?;

    Ok(ChatRequest {
        conversation_id: conversation_id.to_string(),
        message: text.to_string(),
        chat_model_id,
        prompt: config.prompt.clone(),
        temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        knowledge_base_ids: config.knowledge_base_ids.clone(),
        chat_retrieve_config,
    })
}

/// Build the `/chat/new` request that creates a conversation on first send
///
/// Validates exactly what [`compose`] validates, so a configuration that
/// passes here will also compose the follow-up chat request.
pub fn compose_new_conversation(config: &ChatModelConfig) -> Result<NewConversationRequest> {
    let chat_model_id = require_model(config)?;
    let chat_retrieve_config = compose_retrieve_config(config)?;

    Ok(NewConversationRequest {
        chat_model_id,
        prompt: config.prompt.clone(),
        knowledge_base_ids: config.knowledge_base_ids.clone(),
        temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        chat_retrieve_config,
    })
}

fn require_model(config: &ChatModelConfig) -> Result<String> {
    match config.chat_model_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ClientError::configuration("no chat model selected")),
    }
}

fn compose_retrieve_config(config: &ChatModelConfig) -> Result<ChatRetrieveConfig> {
    let top_k = config.top_k.unwrap_or(DEFAULT_TOP_K);
    if !TOP_K_RANGE.contains(&top_k) {
        return Err(ClientError::configuration(format!(
            "top_k must be between 1 and 100, got {}",
            top_k
        )));
    }

    let score_threshold = config.score_threshold.unwrap_or(DEFAULT_SCORE_THRESHOLD);
    check_unit("score_threshold", score_threshold)?;

    let mut retrieve = ChatRetrieveConfig {
        retrieval_mode: config.retrieval_mode,
        top_k,
        score_threshold,
        hybrid_strategy_type: config.hybrid_strategy_type,
        rerank_vector_weight: config.rerank_vector_weight,
        rerank_keyword_weight: config.rerank_keyword_weight,
        rerank_model_id: config.rerank_model_id.clone(),
    };

    if config.retrieval_mode != RetrievalMode::Hybrid {
        return Ok(retrieve);
    }

    // Hybrid without an explicit strategy falls back to weighted fusion,
    // which still needs both weights.
    let strategy = config.hybrid_strategy_type.unwrap_or(HybridStrategy::Weighted);
    retrieve.hybrid_strategy_type = Some(strategy);

    match strategy {
        HybridStrategy::Weighted => {
            // Both weights are forwarded as given; their sum is not checked.
            let vector = config.rerank_vector_weight.ok_or_else(|| {
                ClientError::configuration("weighted hybrid retrieval requires rerank_vector_weight")
            })?;
            let keyword = config.rerank_keyword_weight.ok_or_else(|| {
                ClientError::configuration("weighted hybrid retrieval requires rerank_keyword_weight")
            })?;
            check_unit("rerank_vector_weight", vector)?;
            check_unit("rerank_keyword_weight", keyword)?;
        }
        HybridStrategy::Rerank => {
            let has_model = config
                .rerank_model_id
                .as_deref()
                .is_some_and(|id| !id.trim().is_empty());
            if !has_model {
                return Err(ClientError::configuration(
                    "rerank hybrid retrieval requires rerank_model_id",
                ));
            }
        }
    }

    Ok(retrieve)
}

fn check_unit(field: &str, value: f32) -> Result<()> {
    if UNIT_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(ClientError::configuration(format!(
            "{} must be between 0 and 1, got {}",
            field, value
        )))
    }
}
