//! prompt-enhancer - Claude-powered prompt enhancement with templates and cost tracking
//!
//! This library rewrites vague developer prompts into effective ones by asking the
//! Claude API to apply prompt engineering techniques. Every enhancement is priced
//! from its reported token usage and appended to a local JSONL cost log.
//!
//! # Core Concepts
//!
//! - **Templates**: Eight built-in specialisations (debug, code-review, ...) that
//!   prepend a focused instruction to the expert system prompt
//! - **Enhancement**: One completion request whose JSON answer is either an
//!   improved prompt or a list of clarification questions
//! - **Cost Log**: Append-only record of every enhancement, aggregated into
//!   usage statistics on demand
//!
//! # Example Usage
//!
//! ```no_run
//! use prompt_enhancer::{EnhancementContext, Enhancer, EnhancerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EnhancerConfig::from_env()?;
//! let enhancer = Enhancer::from_config(&config)?;
//!
//! let result = enhancer
//!     .enhance("make a website", &EnhancementContext::default())
//!     .await?;
//!
//! if let Some(enhanced) = result.enhanced() {
//!     println!("{}", enhanced.prompt);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`enhance`]: Orchestrator, prompt composition and response parsing
//! - [`llm`]: Completion API client abstraction and the Anthropic client
//! - [`tracker`]: Cost log storage and statistics
//! - [`templates`]: Built-in template registry
//! - [`cli`] and [`rpc`]: Console, single-shot JSON-RPC and MCP front ends

pub mod cli;
pub mod config;
pub mod enhance;
pub mod llm;
pub mod rpc;
pub mod templates;
pub mod tracker;
pub mod util;
pub mod vagueness;

// Re-export key types for convenient access
pub use config::{ConfigError, EnhancerConfig};
pub use enhance::{
    EnhanceError, EnhancedPrompt, Enhancement, EnhancementContext, EnhancementResult, Enhancer,
    TokenUsage, Usd,
};
pub use llm::{AnthropicClient, BackendError, LLMClient};
pub use templates::{Template, TemplateNotFound};
pub use tracker::{compute_stats, CostLog, LogRecord, Statistics, TrackerError};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
