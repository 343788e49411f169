use config::{Config as ConfigLoader, ConfigError, Environment, File};
use ragchat_client::ClientConfig;
use ragchat_types::ChatModelConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(skip)]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    /// Applies to everything except the answer stream
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

// Same values as config/default.toml, so the binary runs from any directory
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9380/api/v1".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 0. Built-in defaults
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables, e.g. RAGCHAT_SERVER__BASE_URL or
    ///    RAGCHAT_CHAT__KNOWLEDGE_BASE_IDS=kb-1,kb-2
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("RAGCHAT")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("chat.knowledge_base_ids")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // The token is optional; some deployments sit behind a gateway
        cfg.api_token = std::env::var("RAGCHAT_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        Ok(cfg)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.server.base_url.clone(),
            api_token: self.api_token.clone(),
            connect_timeout_secs: self.server.connect_timeout_secs,
            request_timeout_secs: self.server.request_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_types::{HybridStrategy, RetrievalMode};

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [server]
            base_url = "http://localhost:9380/api/v1"
            connect_timeout_secs = 5
            request_timeout_secs = 20

            [chat]
            chat_model_id = "qwen-max"
            knowledge_base_ids = ["kb-1", "kb-2"]
            retrieval_mode = "hybrid"
            hybrid_strategy_type = "weighted"
            rerank_vector_weight = 0.7
            rerank_keyword_weight = 0.3

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.connect_timeout_secs, 5);
        assert_eq!(config.chat.chat_model_id.as_deref(), Some("qwen-max"));
        assert_eq!(config.chat.retrieval_mode, RetrievalMode::Hybrid);
        assert_eq!(config.chat.hybrid_strategy_type, Some(HybridStrategy::Weighted));
        assert_eq!(config.chat.knowledge_base_ids.len(), 2);
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_chat_section_is_optional() {
        let toml = r#"
            [server]
            base_url = "http://localhost:9380"
            connect_timeout_secs = 10
            request_timeout_secs = 30

            [logging]
            level = "info"
            format = "pretty"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.chat.chat_model_id, None);

        let client = config.client_config();
        assert_eq!(client.base_url, "http://localhost:9380");
        assert_eq!(client.request_timeout_secs, 30);
    }

    #[test]
    fn test_loads_without_config_files() {
        let config: Config = ConfigLoader::builder()
            .add_source(File::with_name("does/not/exist").required(false))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.base_url, "http://localhost:9380/api/v1");
        assert_eq!(config.server.connect_timeout_secs, 10);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.chat.chat_model_id, None);
    }

    #[test]
    fn test_partial_server_section_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            base_url = "https://rag.example.com/api/v1"
        "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "https://rag.example.com/api/v1");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.logging.format, "pretty");
    }
}
