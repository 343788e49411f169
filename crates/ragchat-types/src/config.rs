use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    #[default]
    Vector,
    Fulltext,
    Hybrid,
}

/// How hybrid retrieval fuses vector and keyword results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HybridStrategy {
    Weighted,
    Rerank,
}

/// Retrieval and model settings as edited in the UI
///
/// Everything is optional here; the request composer decides what is
/// required and which defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatModelConfig {
    pub chat_model_id: Option<String>,
    /// System prompt
    pub prompt: Option<String>,
    pub temperature: Option<f32>,
    pub knowledge_base_ids: Vec<String>,
    pub retrieval_mode: RetrievalMode,
    pub top_k: Option<u32>,
    pub score_threshold: Option<f32>,
    pub hybrid_strategy_type: Option<HybridStrategy>,
    pub rerank_vector_weight: Option<f32>,
    pub rerank_keyword_weight: Option<f32>,
    pub rerank_model_id: Option<String>,
}

impl ChatModelConfig {
    pub fn new(chat_model_id: impl Into<String>) -> Self {
        Self {
            chat_model_id: Some(chat_model_id.into()),
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_knowledge_bases<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.knowledge_base_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_retrieval_mode(mut self, mode: RetrievalMode) -> Self {
        self.retrieval_mode = mode;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    /// Hybrid retrieval with weighted score fusion
    pub fn with_weighted_hybrid(mut self, vector_weight: f32, keyword_weight: f32) -> Self {
        self.retrieval_mode = RetrievalMode::Hybrid;
        self.hybrid_strategy_type = Some(HybridStrategy::Weighted);
        self.rerank_vector_weight = Some(vector_weight);
        self.rerank_keyword_weight = Some(keyword_weight);
        self
    }

    /// Hybrid retrieval with a second rerank model pass
    pub fn with_rerank_hybrid(mut self, rerank_model_id: impl Into<String>) -> Self {
        self.retrieval_mode = RetrievalMode::Hybrid;
        self.hybrid_strategy_type = Some(HybridStrategy::Rerank);
        self.rerank_model_id = Some(rerank_model_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_hybrid_mode() {
        let config = ChatModelConfig::new("qwen-max").with_weighted_hybrid(0.7, 0.3);

        assert_eq!(config.retrieval_mode, RetrievalMode::Hybrid);
        assert_eq!(config.hybrid_strategy_type, Some(HybridStrategy::Weighted));
        assert_eq!(config.rerank_vector_weight, Some(0.7));
        assert_eq!(config.rerank_keyword_weight, Some(0.3));
    }

    #[test]
    fn test_partial_toml_like_json() {
        let json = r#"{"chat_model_id":"m1","retrieval_mode":"fulltext","top_k":5}"#;
        let config: ChatModelConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.retrieval_mode, RetrievalMode::Fulltext);
        assert_eq!(config.top_k, Some(5));
        assert!(config.knowledge_base_ids.is_empty());
        assert!(config.temperature.is_none());
    }
}
