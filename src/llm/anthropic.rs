//! Anthropic Messages API client
//!
//! A thin `reqwest` client for `POST /v1/messages`. Only the pieces of the wire
//! format this crate needs are modelled: a system instruction, user
//! messages, sampling settings, text content blocks and token usage.
//!
//! # Example
//!
//! ```no_run
//! use prompt_enhancer::llm::{AnthropicClient, ChatMessage, LLMClient, LLMRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AnthropicClient::new(
//!     "sk-ant-...".to_string(),
//!     "claude-sonnet-4-5-20250929".to_string(),
//! )?;
//!
//! let request = LLMRequest::new(vec![ChatMessage::user("Hello")])
//!     .with_system("You are terse.")
//!     .with_max_tokens(256);
//!
//! let response = client.chat(request).await?;
//! println!("{}", response.first_text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest, LLMResponse, TokenCounts};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The Messages API requires `max_tokens`; used when the request leaves it unset
const FALLBACK_MAX_TOKENS: u32 = 1024;

pub struct AnthropicClient {
    api_key: String,
    model: String,
    base_url: String,
    http_client: Client,
    timeout: Option<Duration>,
}

impl AnthropicClient {
    /// Creates a client against the public API with no request timeout
    pub fn new(api_key: String, model: String) -> Result<Self, BackendError> {
        Self::with_options(api_key, model, DEFAULT_BASE_URL.to_string(), None)
    }

    /// Creates a client with a custom base URL and optional request timeout
    ///
    /// The base URL is the API root without the `/v1/messages` suffix, e.g.
    /// `http://localhost:8080` for a proxy or a mock server.
    pub fn with_options(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Option<Duration>,
    ) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| BackendError::ConfigurationError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            timeout,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_body<'a>(&'a self, request: &'a LLMRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: &request.messages,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            let seconds = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
            error!("Anthropic request timed out after {}s", seconds);
            BackendError::TimeoutError { seconds }
        } else if e.is_connect() {
            error!("Cannot connect to {}", self.base_url);
            BackendError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else {
            error!("Anthropic request error: {}", e);
            BackendError::NetworkError {
                message: format!("Request failed: {}", e),
            }
        }
    }
}

/// Maps a non-success HTTP status to a backend error
fn status_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            BackendError::AuthenticationError { message }
        }
        StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimitError { retry_after },
        _ => BackendError::ApiError {
            message: format!("HTTP {}: {}", status, message),
            status_code: Some(status.as_u16()),
        },
    }
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let body = self.build_body(&request);
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            max_tokens = body.max_tokens,
            "Sending Anthropic messages request"
        );

        let start = Instant::now();

        let response = self
            .http_client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            error!("Anthropic API returned error status {}: {}", status, body);
            return Err(status_error(status, retry_after, &body));
        }

        let api_response: MessagesResponse = response.json().await.map_err(|e| {
            error!("Failed to decode Anthropic response: {}", e);
            BackendError::InvalidResponse {
                message: format!("JSON decode error: {}", e),
            }
        })?;

        let elapsed = start.elapsed();
        info!(
            "Anthropic completion finished in {:.2}s (input_tokens={}, output_tokens={})",
            elapsed.as_secs_f64(),
            api_response.usage.input_tokens,
            api_response.usage.output_tokens
        );

        let text_blocks = api_response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        Ok(LLMResponse {
            text_blocks,
            usage: TokenCounts::new(
                api_response.usage.input_tokens,
                api_response.usage.output_tokens,
            ),
            response_time: elapsed,
        })
    }

    fn name(&self) -> &str {
        "Anthropic"
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
