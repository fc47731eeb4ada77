//! Recovery of the structured answer from free model text

use super::types::{EnhancedPrompt, Enhancement};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("No JSON object found in response")]
    NoJson,
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("{0}")]
    SchemaMismatch(String),
}

/// A validated model answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEnhancement {
    pub enhancement: Enhancement,
    pub explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnswer {
    #[serde(default)]
    needs_clarification: Option<bool>,
    #[serde(default)]
    clarification_questions: Option<Vec<String>>,
    #[serde(default)]
    enhanced: Option<RawEnhanced>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEnhanced {
    prompt: Option<String>,
    techniques: Option<Vec<String>>,
    improvements: Option<Vec<String>>,
    confidence: Option<f64>,
}

fn fenced_json_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("fenced JSON pattern is valid")
    })
}

/// Locates the JSON text in a model response
///
/// A fenced block labelled `json` wins; otherwise the span from the first `{`
/// to the last `}` is taken. A fenced block is returned even if its content
/// later fails to parse.
pub fn extract_json(response: &str) -> Result<&str, ExtractError> {
    if let Some(body) = fenced_json_regex()
        .captures(response)
        .and_then(|captures| captures.get(1))
    {
        debug!("Found fenced JSON block ({} chars)", body.as_str().len());
        return Ok(body.as_str());
    }

    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&response[start..=end]),
        _ => Err(ExtractError::NoJson),
    }
}

/// Extracts, parses and validates the model answer
pub fn parse_enhancement(response: &str) -> Result<ParsedEnhancement, ExtractError> {
    let json_str = extract_json(response)?;

    let value: serde_json::Value = serde_json::from_str(json_str).map_err(|e| {
        warn!("JSON parse error: {}", e);
        ExtractError::InvalidJson(format!(
            "{}: {}",
            e,
            json_str.chars().take(100).collect::<String>()
        ))
    })?;

    let raw: RawAnswer = serde_json::from_value(value)
        .map_err(|e| ExtractError::SchemaMismatch(e.to_string()))?;

    convert_answer(raw)
}

fn convert_answer(raw: RawAnswer) -> Result<ParsedEnhancement, ExtractError> {
    let enhancement = if raw.needs_clarification.unwrap_or(false) {
        let questions = raw.clarification_questions.unwrap_or_default();
        if questions.is_empty() {
            return Err(ExtractError::SchemaMismatch(
                "needsClarification is true but clarificationQuestions is empty".to_string(),
            ));
        }
        Enhancement::NeedsClarification { questions }
    } else {
        let enhanced = raw
            .enhanced
            .ok_or_else(|| missing_field("enhanced"))?;
        Enhancement::Enhanced(convert_enhanced(enhanced)?)
    };

    Ok(ParsedEnhancement {
        enhancement,
        explanation: raw.explanation,
    })
}

fn convert_enhanced(raw: RawEnhanced) -> Result<EnhancedPrompt, ExtractError> {
    let prompt = raw.prompt.ok_or_else(|| missing_field("enhanced.prompt"))?;
    let techniques = raw
        .techniques
        .ok_or_else(|| missing_field("enhanced.techniques"))?;
    let improvements = raw
        .improvements
        .ok_or_else(|| missing_field("enhanced.improvements"))?;
    let confidence_raw = raw
        .confidence
        .ok_or_else(|| missing_field("enhanced.confidence"))?;

    let confidence = confidence_raw.round().clamp(1.0, 10.0);
    if confidence != confidence_raw {
        warn!(
            "Confidence value {} was out of range, clamped to {}",
            confidence_raw, confidence
        );
    }

    Ok(EnhancedPrompt {
        prompt,
        techniques,
        improvements,
        confidence: confidence as u8,
    })
}

fn missing_field(field: &str) -> ExtractError {
    ExtractError::SchemaMismatch(format!("Missing required field: {}", field))
}
