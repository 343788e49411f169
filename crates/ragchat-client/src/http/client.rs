// HTTP implementation of the chat backend

use async_trait::async_trait;
use futures::StreamExt;
use ragchat_types::{Conversation, Message};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Response, StatusCode, Url};
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::traits::{ByteStream, ChatBackend};
use crate::types::{
    ChatRequest, ConversationList, MessageList, NewConversationRequest, NewConversationResponse,
    RenameConversationRequest,
};

/// Chat backend over HTTP with bearer authentication
#[derive(Debug)]
pub struct HttpChatBackend {
    http_client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpChatBackend {
    /// Create new backend with builder pattern
    pub fn builder() -> HttpChatBackendBuilder {
        HttpChatBackendBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/chat/conversations/{id}` plus `tail`, with the id escaped as one segment
    fn conversation_url(&self, conversation_id: &str, tail: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.url("/chat/conversations"))
            .map_err(|e| ClientError::configuration(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::configuration("Base URL cannot hold a path"))?
            .push(conversation_id)
            .extend(tail);
        Ok(url)
    }

    /// Map non-success statuses to typed errors
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Chat backend rejected credentials");
            return Err(ClientError::Unauthorized);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());

        tracing::error!("Chat backend request failed: status={}, body={}", status, body);

        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn create_conversation(&self, request: NewConversationRequest) -> Result<String> {
        tracing::debug!(model = %request.chat_model_id, "Creating conversation");

        let response = self
            .http_client
            .post(self.url("/chat/new"))
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await?;

        let created: NewConversationResponse = Self::check_status(response).await?.json().await?;

        if created.conversation_id.is_empty() {
            return Err(ClientError::InvalidResponse(
                "empty conversation_id in /chat/new response".to_string(),
            ));
        }

        tracing::info!(conversation_id = %created.conversation_id, "Conversation created");
        Ok(created.conversation_id)
    }

    async fn open_chat_stream(&self, request: ChatRequest) -> Result<ByteStream> {
        tracing::debug!(conversation_id = %request.conversation_id, "Opening chat stream");

        // No total timeout here: the answer may stream for minutes.
        let response = self
            .http_client
            .post(self.url("/chat/sse"))
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(&request)
            .send()
            .await?;

        let response = Self::check_status(response).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ClientError::from));

        Ok(Box::pin(stream))
    }

    async fn list_conversations(&self, page: u32, page_size: u32) -> Result<Vec<Conversation>> {
        let response = self
            .http_client
            .get(self.url("/chat/conversations"))
            .timeout(self.request_timeout)
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await?;

        let listing: ConversationList = Self::check_status(response).await?.json().await?;
        Ok(listing.list)
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let response = self
            .http_client
            .get(self.conversation_url(conversation_id, &["messages"])?)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let listing: MessageList = Self::check_status(response).await?.json().await?;
        Ok(listing.list)
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        let response = self
            .http_client
            .delete(self.conversation_url(conversation_id, &[])?)
            .timeout(self.request_timeout)
            .send()
            .await?;

        Self::check_status(response).await?;
        tracing::info!(conversation_id, "Conversation deleted");
        Ok(())
    }

    async fn rename_conversation(&self, conversation_id: &str, title: &str) -> Result<()> {
        let response = self
            .http_client
            .put(self.conversation_url(conversation_id, &[])?)
            .timeout(self.request_timeout)
            .json(&RenameConversationRequest { title })
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }
}

/// Builder for HttpChatBackend
#[derive(Default)]
pub struct HttpChatBackendBuilder {
    base_url: Option<String>,
    api_token: Option<String>,
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl HttpChatBackendBuilder {
    /// Set the API base URL
    /// Example: "https://rag.example.com/api/v1"
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpChatBackend> {
        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::configuration("Base URL is required"))?;

        // Remove trailing slash from base URL
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::configuration("Invalid API token format"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(self.connect_timeout.unwrap_or(Duration::from_secs(10)))
            .build()
            .map_err(|e| ClientError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpChatBackend {
            http_client,
            base_url,
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
        })
    }
}
