// Client for the hosted "ai-chat" function (HTTP direct, no SDK)

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use crate::error::{AIServiceError, Result};
use crate::streaming::AssistantReply;
use crate::traits::{AssistantClient, ChatRequest};

pub const DEFAULT_FUNCTION_NAME: &str = "ai-chat";

/// Calls a server-side AI function hosted next to the relational store
pub struct EdgeFunctionClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl EdgeFunctionClient {
    pub fn builder() -> EdgeFunctionClientBuilder {
        EdgeFunctionClientBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AssistantClient for EdgeFunctionClient {
    async fn send(&self, request: ChatRequest) -> Result<AssistantReply> {
        tracing::debug!(endpoint = %self.endpoint, "Calling AI service");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "AI service returned an error");
            return Err(AIServiceError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let header = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        match ReplyKind::from_header(header.as_deref()) {
            ReplyKind::Stream => {
                tracing::debug!(content_type = ?header, "Streaming AI response");
                let bytes = response.bytes_stream().map(|chunk| {
                    chunk
                        .map(|b| b.to_vec())
                        .map_err(|e| AIServiceError::Stream(e.to_string()))
                });
                Ok(AssistantReply::Stream(Box::pin(bytes)))
            }
            ReplyKind::Json => {
                let body = response.text().await?;
                let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
                    AIServiceError::UnsupportedFormat(format!("invalid JSON body: {}", e))
                })?;
                AssistantReply::from_json(value)
            }
            ReplyKind::Text => {
                let text = response.text().await?;
                if text.is_empty() {
                    return Err(AIServiceError::EmptyResponse);
                }
                Ok(AssistantReply::Text(text))
            }
            ReplyKind::Unsupported(other) => Err(AIServiceError::UnsupportedFormat(format!(
                "content type '{}'",
                other
            ))),
        }
    }

    fn name(&self) -> &str {
        "edge-function"
    }
}

/// How a successful response body is read
#[derive(Debug, PartialEq, Eq)]
enum ReplyKind {
    Stream,
    Json,
    Text,
    Unsupported(String),
}

impl ReplyKind {
    /// A response without a Content-Type is read as plain text
    fn from_header(header: Option<&str>) -> Self {
        let Some(header) = header else {
            return ReplyKind::Text;
        };

        match media_type(header).as_str() {
            "text/event-stream" | "application/octet-stream" | "application/x-ndjson" => {
                ReplyKind::Stream
            }
            "application/json" => ReplyKind::Json,
            "text/plain" | "" => ReplyKind::Text,
            other => ReplyKind::Unsupported(other.to_string()),
        }
    }
}

/// `text/event-stream; charset=utf-8` -> `text/event-stream`
fn media_type(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[derive(Default)]
pub struct EdgeFunctionClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    function_name: Option<String>,
    timeout: Option<Duration>,
}

impl EdgeFunctionClientBuilder {
    /// Public (anon) key of the hosted project
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Project base URL, e.g. "https://abc.supabase.co"
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    /// Overall request timeout. Unset by default so long streams are not cut off.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<EdgeFunctionClient> {
        let api_key = self
            .api_key
            .ok_or_else(|| AIServiceError::Configuration("API key is required".to_string()))?;
        let base_url = self
            .base_url
            .ok_or_else(|| AIServiceError::Configuration("Base URL is required".to_string()))?;
        let function_name = self
            .function_name
            .unwrap_or_else(|| DEFAULT_FUNCTION_NAME.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| AIServiceError::Configuration("Invalid API key format".to_string()))?,
        );
        headers.insert(
            HeaderName::from_static("apikey"),
            HeaderValue::from_str(&api_key)
                .map_err(|_| AIServiceError::Configuration("Invalid API key format".to_string()))?,
        );

        let mut http_builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            http_builder = http_builder.timeout(timeout);
        }
        let http_client = http_builder.build()?;

        let endpoint = format!(
            "{}/functions/v1/{}",
            base_url.trim_end_matches('/'),
            function_name.trim_matches('/')
        );

        Ok(EdgeFunctionClient {
            http_client,
            endpoint,
        })
    }
}
