use super::cost::TokenUsage;
use serde::{Deserialize, Serialize, Serializer};

/// Optional caller-supplied context for an enhancement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhancementContext {
    /// Template key; resolved against the template registry
    #[serde(alias = "templateKey", skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl EnhancementContext {
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Default::default()
        }
    }
}

/// The improved prompt and its rationale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedPrompt {
    pub prompt: String,
    pub techniques: Vec<String>,
    pub improvements: Vec<String>,
    /// Always within 1..=10
    pub confidence: u8,
}

/// The two shapes a valid model answer can take
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enhancement {
    NeedsClarification { questions: Vec<String> },
    Enhanced(EnhancedPrompt),
}

/// Outcome of one enhancement round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementResult {
    pub original: String,
    pub template: Option<String>,
    pub enhancement: Enhancement,
    pub explanation: Option<String>,
    pub usage: TokenUsage,
}

impl EnhancementResult {
    pub fn needs_clarification(&self) -> bool {
        matches!(self.enhancement, Enhancement::NeedsClarification { .. })
    }

    pub fn enhanced(&self) -> Option<&EnhancedPrompt> {
        match &self.enhancement {
            Enhancement::Enhanced(enhanced) => Some(enhanced),
            Enhancement::NeedsClarification { .. } => None,
        }
    }

    pub fn clarification_questions(&self) -> Option<&[String]> {
        match &self.enhancement {
            Enhancement::NeedsClarification { questions } => Some(questions),
            Enhancement::Enhanced(_) => None,
        }
    }
}

/// Flat wire shape shared by the JSON output and the protocol response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultWire<'a> {
    original: &'a str,
    needs_clarification: bool,
    clarification_questions: Option<&'a [String]>,
    enhanced: Option<&'a EnhancedPrompt>,
    explanation: Option<&'a str>,
    usage: &'a TokenUsage,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<&'a str>,
}

impl Serialize for EnhancementResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ResultWire {
            original: &self.original,
            needs_clarification: self.needs_clarification(),
            clarification_questions: self.clarification_questions(),
            enhanced: self.enhanced(),
            explanation: self.explanation.as_deref(),
            usage: &self.usage,
            template: self.template.as_deref(),
        }
        .serialize(serializer)
    }
}
