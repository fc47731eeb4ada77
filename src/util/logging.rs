//! Structured logging setup for prompt-enhancer
//!
//! This module provides initialization and configuration for structured logging using
//! the `tracing` ecosystem.
//!
//! Diagnostics always go to **stderr**. Stdout carries rendered results and
//! protocol responses and must stay clean.
//!
//! # Example
//!
//! ```no_run
//! use prompt_enhancer::util::logging;
//!
//! // With environment: PROMPT_ENHANCER_LOG_LEVEL=debug
//! logging::init_from_env();
//!
//! tracing::info!("Application started");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., prompt_enhancer::enhance) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    /// Defaults to WARN so that a normal CLI run prints nothing but its result
    fn default() -> Self {
        Self {
            level: Level::WARN,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Reads `PROMPT_ENHANCER_LOG_LEVEL` and `PROMPT_ENHANCER_LOG_JSON`
    pub fn from_env() -> Self {
        let level = env::var("PROMPT_ENHANCER_LOG_LEVEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_level(&v))
            .unwrap_or(Level::WARN);

        let use_json = env::var("PROMPT_ENHANCER_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string
///
/// # Example
///
/// ```
/// use prompt_enhancer::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("invalid"), Level::WARN);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to WARN. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::WARN
        }
    }
}

fn directive(spec: &str) -> Option<Directive> {
    spec.parse().ok()
}

fn default_directives(level: Level) -> Vec<String> {
    vec![
        format!("prompt_enhancer={}", level),
        "h2=warn".to_string(),
        "hyper=warn".to_string(),
        "reqwest=warn".to_string(),
    ]
}

/// Initializes the logging system with the provided configuration
///
/// Only the first call has any effect. When `RUST_LOG` is set it replaces the
/// configured level entirely.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            for spec in default_directives(config.level) {
                if let Some(d) = directive(&spec) {
                    filter = filter.add_directive(d);
                }
            }
        }

        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
    });
}

/// Initializes logging from `PROMPT_ENHANCER_LOG_LEVEL` and `PROMPT_ENHANCER_LOG_JSON`
pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
