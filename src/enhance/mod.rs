//! Prompt enhancement orchestration
//!
//! [`Enhancer`] is the single entry point shared by every front end. One call to
//! [`Enhancer::enhance`] makes exactly one completion request:
//!
//! 1. Resolves the optional template before touching the network
//! 2. Composes the system instruction and the user message
//! 3. Calls the completion API through the [`LLMClient`] trait
//! 4. Extracts and validates the JSON answer from the first text block
//! 5. Prices the reported token usage
//! 6. Appends one record to the cost log
//!
//! # Example
//!
//! ```no_run
//! use prompt_enhancer::enhance::{EnhancementContext, Enhancer};
//! use prompt_enhancer::EnhancerConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EnhancerConfig::from_env()?;
//! let enhancer = Enhancer::from_config(&config)?;
//!
//! let result = enhancer
//!     .enhance("fix the error", &EnhancementContext::with_template("debug"))
//!     .await?;
//!
//! println!("Cost: ${}", result.usage.cost.total);
//! # Ok(())
//! # }
//! ```

mod cost;
mod error;
mod prompt;
mod response;
mod types;

pub use cost::{
    CostBreakdown, Pricing, TokenUsage, Usd, DEFAULT_INPUT_PRICE_PER_MILLION,
    DEFAULT_OUTPUT_PRICE_PER_MILLION,
};
pub use error::EnhanceError;
pub use prompt::{build_system_prompt, build_user_message, BASE_SYSTEM_PROMPT};
pub use response::{extract_json, parse_enhancement, ExtractError, ParsedEnhancement};
pub use types::{EnhancedPrompt, Enhancement, EnhancementContext, EnhancementResult};

use crate::config::{EnhancerConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::llm::{AnthropicClient, ChatMessage, LLMClient, LLMRequest};
use crate::templates;
use crate::tracker::{CostLog, LogRecord};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Enhancer {
    client: Arc<dyn LLMClient>,
    cost_log: CostLog,
    pricing: Pricing,
    temperature: f32,
    max_tokens: u32,
}

impl Enhancer {
    /// Creates an enhancer with default pricing and sampling settings
    pub fn new(client: Arc<dyn LLMClient>, cost_log: CostLog) -> Self {
        Self {
            client,
            cost_log,
            pricing: Pricing::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Builds an enhancer backed by the Anthropic API
    ///
    /// # Errors
    ///
    /// `MissingCredential` when no API key is configured. The check happens
    /// here so that no request is ever attempted without one.
    pub fn from_config(config: &EnhancerConfig) -> Result<Self, EnhanceError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(EnhanceError::MissingCredential)?;

        let client = AnthropicClient::with_options(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
            config.request_timeout(),
        )?;

        Ok(Self::new(Arc::new(client), CostLog::new(&config.log_file))
            .with_pricing(config.pricing)
            .with_sampling(config.temperature, config.max_tokens))
    }

    pub fn cost_log(&self) -> &CostLog {
        &self.cost_log
    }

    pub async fn enhance(
        &self,
        original_prompt: &str,
        context: &EnhancementContext,
    ) -> Result<EnhancementResult, EnhanceError> {
        let template = context
            .template
            .as_deref()
            .map(templates::get)
            .transpose()?;
        if let Some(template) = template {
            info!("Using \"{}\" template", template.name);
        }

        let request = LLMRequest::new(vec![ChatMessage::user(build_user_message(
            original_prompt,
            context,
        ))])
        .with_system(build_system_prompt(template))
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        info!(
            "Calling {} for prompt enhancement ({})",
            self.client.name(),
            self.client.model_info().unwrap_or_default()
        );
        let response = self.client.chat(request).await?;
        debug!(
            "Received response in {:?} ({} text blocks)",
            response.response_time,
            response.text_blocks.len()
        );

        let text = response.first_text().ok_or_else(|| {
            warn!("Response contained no text content");
            EnhanceError::ResponseParseError("Response contained no text content".to_string())
        })?;
        let parsed = parse_enhancement(text)?;

        let result = EnhancementResult {
            original: original_prompt.to_string(),
            template: template.map(|t| t.key.to_string()),
            enhancement: parsed.enhancement,
            explanation: parsed.explanation,
            usage: self.pricing.usage(response.usage),
        };

        self.cost_log.append(&LogRecord::from_result(&result));

        Ok(result)
    }
}

impl std::fmt::Debug for Enhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enhancer")
            .field("client", &self.client.name())
            .field("cost_log", &self.cost_log)
            .field("pricing", &self.pricing)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BackendError, MockLLMClient, MockResponse};
    use tempfile::TempDir;

    const ANSWER: &str = r#"```json
{"needsClarification": false, "enhanced": {"prompt": "Act as...", "techniques": ["role-assignment"], "improvements": ["persona"], "confidence": 8}, "explanation": "why"}
```"#;

    fn enhancer(mock: Arc<MockLLMClient>, dir: &TempDir) -> Enhancer {
        Enhancer::new(mock, CostLog::new(dir.path().join("log.jsonl")))
    }

    #[tokio::test]
    async fn test_request_carries_sampling_and_system() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockLLMClient::new());
        mock.add_response(MockResponse::text(ANSWER).with_usage(100, 50));

        let enhancer = enhancer(mock.clone(), &dir).with_sampling(0.3, 512);
        enhancer
            .enhance("make a website", &EnhancementContext::with_template("debug"))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(512));
        let system = request.system.as_deref().unwrap();
        assert!(system.starts_with(templates::get("debug").unwrap().system_prompt));
        assert!(request.messages[0].content.contains("Template: debug"));
    }

    #[tokio::test]
    async fn test_unknown_template_makes_no_call() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockLLMClient::new());

        let err = enhancer(mock.clone(), &dir)
            .enhance("x", &EnhancementContext::with_template("nope"))
            .await
            .unwrap_err();

        assert!(matches!(err, EnhanceError::TemplateNotFound(_)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_response_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockLLMClient::new());
        mock.add_response(MockResponse::empty());

        let err = enhancer(mock, &dir)
            .enhance("x", &EnhancementContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, EnhanceError::ResponseParseError(_)));
    }

    #[tokio::test]
    async fn test_api_failure_propagates_cause() {
        let dir = TempDir::new().unwrap();
        let mock = Arc::new(MockLLMClient::new());
        mock.add_response(MockResponse::error(BackendError::RateLimitError {
            retry_after: Some(5),
        }));

        let enhancer = enhancer(mock, &dir);
        let err = enhancer
            .enhance("x", &EnhancementContext::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EnhanceError::ApiCallFailed(BackendError::RateLimitError { .. })
        ));
        assert!(enhancer.cost_log().load_all().unwrap().is_empty());
    }

    #[test]
    fn test_from_config_requires_credential() {
        let config = EnhancerConfig::default();
        assert!(matches!(
            Enhancer::from_config(&config),
            Err(EnhanceError::MissingCredential)
        ));

        let config = EnhancerConfig {
            api_key: Some("sk-ant-test".to_string()),
            ..Default::default()
        };
        assert!(Enhancer::from_config(&config).is_ok());
    }
}
