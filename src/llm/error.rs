//! Transport-level errors raised by LLM clients

use thiserror::Error;

/// Errors that can occur while talking to a completion API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// API request failed with the given message
    #[error("API error{}: {message}", .status_code.map(|c| format!(" ({})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Authentication failed or credentials are invalid
    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    /// Request timed out after the specified duration (in seconds)
    #[error("Request timed out after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    /// Rate limit exceeded, retry after the specified duration (in seconds)
    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(", retry after {} seconds", s)).unwrap_or_default())]
    RateLimitError { retry_after: Option<u64> },

    /// The API answered but the body could not be decoded
    #[error("Invalid response from LLM: {message}")]
    InvalidResponse { message: String },

    /// Client could not be built from its settings
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Error: {message}")]
    Other { message: String },
}
