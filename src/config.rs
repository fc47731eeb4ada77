//! Configuration management for prompt-enhancer
//!
//! Settings are read from environment variables with defaults. `main` seeds the
//! environment from a `.env` file first, so either source works.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY`: API credential - **required** to enhance
//! - `ANTHROPIC_BASE_URL`: API root - default: "https://api.anthropic.com"
//! - `PROMPT_ENHANCER_MODEL`: Model id - default: "claude-sonnet-4-5-20250929"
//! - `PROMPT_ENHANCER_MAX_TOKENS`: Output bound - default: "2048"
//! - `PROMPT_ENHANCER_TEMPERATURE`: Sampling temperature - default: "0.7"
//! - `PROMPT_ENHANCER_INPUT_PRICE`: USD per million input tokens - default: "3.00"
//! - `PROMPT_ENHANCER_OUTPUT_PRICE`: USD per million output tokens - default: "15.00"
//! - `PROMPT_ENHANCER_REQUEST_TIMEOUT`: Timeout in seconds - default: none
//! - `PROMPT_ENHANCER_LOG_FILE`: Cost log path - default: "<data dir>/prompt-enhancer/enhancement-log.jsonl"
//! - `PROMPT_ENHANCER_LOG_LEVEL`: Diagnostic log level - default: "warn"
//!
//! # Example
//!
//! ```no_run
//! use prompt_enhancer::EnhancerConfig;
//!
//! let config = EnhancerConfig::from_env().expect("valid configuration");
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::enhance::Pricing;
use crate::llm::DEFAULT_BASE_URL;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default values for configuration
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_LOG_LEVEL: &str = "warn";
const LOG_FILE_NAME: &str = "enhancement-log.jsonl";
const APP_DIR: &str = "prompt-enhancer";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnhancerConfig {
    /// Anthropic API key; enhancement refuses to start without it
    pub api_key: Option<String>,

    pub base_url: String,

    pub model: String,

    pub max_tokens: u32,

    pub temperature: f32,

    pub pricing: Pricing,

    /// Request timeout in seconds; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,

    /// Cost log location
    pub log_file: PathBuf,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            pricing: Pricing::default(),
            request_timeout_secs: None,
            log_file: default_log_file(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// `<data dir>/prompt-enhancer/enhancement-log.jsonl`, falling back to the
/// temp directory when the platform has no data directory
pub fn default_log_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR)
        .join(LOG_FILE_NAME)
}

impl EnhancerConfig {
    /// Loads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Cost log location alone, without parsing or validating anything else
    pub fn log_file_from_env() -> PathBuf {
        Self::log_file_from_lookup(|key| env::var(key).ok())
    }

    pub fn log_file_from_lookup<F>(lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("PROMPT_ENHANCER_LOG_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_log_file)
    }

    /// Loads the configuration through an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let pricing = Pricing::new(
            parse_var(&get, "PROMPT_ENHANCER_INPUT_PRICE")?
                .unwrap_or(defaults.pricing.input_per_million),
            parse_var(&get, "PROMPT_ENHANCER_OUTPUT_PRICE")?
                .unwrap_or(defaults.pricing.output_per_million),
        );

        Ok(Self {
            api_key: get("ANTHROPIC_API_KEY"),
            base_url: get("ANTHROPIC_BASE_URL").unwrap_or(defaults.base_url),
            model: get("PROMPT_ENHANCER_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_var(&get, "PROMPT_ENHANCER_MAX_TOKENS")?
                .unwrap_or(defaults.max_tokens),
            temperature: parse_var(&get, "PROMPT_ENHANCER_TEMPERATURE")?
                .unwrap_or(defaults.temperature),
            pricing,
            request_timeout_secs: parse_var(&get, "PROMPT_ENHANCER_REQUEST_TIMEOUT")?,
            log_file: Self::log_file_from_lookup(&lookup),
            log_level: get("PROMPT_ENHANCER_LOG_LEVEL")
                .map(|v| v.to_lowercase())
                .unwrap_or(defaults.log_level),
        })
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any validation fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "Temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 || self.max_tokens > 64_000 {
            return Err(ConfigError::ValidationFailed(format!(
                "Max tokens must be between 1 and 64000, got {}",
                self.max_tokens
            )));
        }

        for (name, price) in [
            ("Input price", self.pricing.input_per_million),
            ("Output price", self.pricing.output_per_million),
        ] {
            if !price.is_finite() || price < 0.0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be a non-negative number, got {}",
                    name, price
                )));
            }
        }

        if let Some(timeout) = self.request_timeout_secs {
            if timeout == 0 {
                return Err(ConfigError::ValidationFailed(
                    "Request timeout must be at least 1 second".to_string(),
                ));
            }
            if timeout > 600 {
                return Err(ConfigError::ValidationFailed(
                    "Request timeout cannot exceed 10 minutes".to_string(),
                ));
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Converts configuration to a display map for output formatting
    ///
    /// The API key is masked.
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("api_key".to_string(), self.masked_api_key());
        map.insert("base_url".to_string(), self.base_url.clone());
        map.insert("model".to_string(), self.model.clone());
        map.insert("max_tokens".to_string(), self.max_tokens.to_string());
        map.insert("temperature".to_string(), self.temperature.to_string());
        map.insert(
            "input_price_per_million".to_string(),
            format!("{:.2}", self.pricing.input_per_million),
        );
        map.insert(
            "output_price_per_million".to_string(),
            format!("{:.2}", self.pricing.output_per_million),
        );
        if let Some(timeout) = self.request_timeout_secs {
            map.insert("request_timeout_secs".to_string(), timeout.to_string());
        }
        map.insert("log_file".to_string(), self.log_file.display().to_string());
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }

    fn masked_api_key(&self) -> String {
        match &self.api_key {
            Some(key) if key.chars().count() > 8 => {
                let tail: String = key.chars().skip(key.chars().count() - 4).collect();
                format!("****{}", tail)
            }
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        }
    }
}

fn parse_var<T, G>(get: &G, field: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(field)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::ParseError {
                field: field.to_string(),
                error: e.to_string(),
            })
        })
        .transpose()
}

impl fmt::Display for EnhancerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prompt Enhancer Configuration:")?;
        writeln!(f, "  API Key: {}", self.masked_api_key())?;
        writeln!(f, "  Base URL: {}", self.base_url)?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Max Tokens: {}", self.max_tokens)?;
        writeln!(f, "  Temperature: {}", self.temperature)?;
        writeln!(
            f,
            "  Pricing: ${:.2} / ${:.2} per 1M input/output tokens",
            self.pricing.input_per_million, self.pricing.output_per_million
        )?;
        match self.request_timeout_secs {
            Some(timeout) => writeln!(f, "  Request Timeout: {}s", timeout)?,
            None => writeln!(f, "  Request Timeout: none")?,
        }
        writeln!(f, "  Cost Log: {}", self.log_file.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
