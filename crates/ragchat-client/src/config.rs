// Configuration layer for creating a chat backend

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::http::HttpChatBackend;
use crate::traits::ChatBackend;

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Connection settings for the chat backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. "https://rag.example.com/api/v1"
    pub base_url: String,
    /// Bearer token attached to every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Applies to non-streaming calls only
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

/// Factory for creating backends from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_backend(config: ClientConfig) -> Result<Arc<dyn ChatBackend>> {
        let mut builder = HttpChatBackend::builder()
            .base_url(config.base_url)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .request_timeout(Duration::from_secs(config.request_timeout_secs));

        if let Some(token) = config.api_token {
            builder = builder.api_token(token);
        }

        Ok(Arc::new(builder.build()?))
    }
}
