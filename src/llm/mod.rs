//! LLM client abstraction layer
//!
//! This module provides a trait-based abstraction for the completion API,
//! allowing the real Anthropic client and the scripted mock to be used
//! interchangeably.

mod anthropic;
mod client;
mod error;
mod mock;
mod types;

pub use anthropic::{AnthropicClient, ANTHROPIC_VERSION, DEFAULT_BASE_URL};
pub use client::LLMClient;
pub use error::BackendError;
pub use mock::{MockLLMClient, MockResponse};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole, TokenCounts};
