//! System instruction and user message composition

use super::types::EnhancementContext;
use crate::templates::Template;

/// Base instruction sent with every enhancement request
pub const BASE_SYSTEM_PROMPT: &str = r#"You are an expert prompt engineering consultant specializing in helping developers write better prompts for AI tools.

Your role is to transform vague, unclear, or ineffective prompts into highly effective ones using these techniques:

1. **Role Assignment**: Add expert personas (e.g., "Act as a senior software architect...")
2. **Context Addition**: Include relevant technical context and constraints
3. **Step-by-Step Structure**: Break complex requests into clear steps
4. **Output Specification**: Define exactly what format the response should take
5. **Example Provision**: Add examples when helpful
6. **Constraint Definition**: Specify limitations, requirements, preferences

When enhancing a prompt, you should:
- Ask clarifying questions if the request is very vague
- Apply appropriate prompt engineering techniques
- Explain WHY each enhancement improves the prompt
- Show both the original and enhanced versions
- Provide a confidence score (1-10) for the enhancement

Return your response in this JSON structure:
{
  "needsClarification": boolean,
  "clarificationQuestions": ["question1", "question2"] or null,
  "enhanced": {
    "prompt": "The enhanced prompt",
    "techniques": ["technique1", "technique2"],
    "improvements": ["improvement1", "improvement2"],
    "confidence": 1-10
  },
  "explanation": "Why this enhancement works better"
}"#;

const CLOSING_INSTRUCTION: &str = "Enhance this prompt using prompt engineering best practices.";

/// Template fragment, a blank line, then the base instruction
pub fn build_system_prompt(template: Option<&Template>) -> String {
    match template {
        Some(template) => format!("{}\n\n{}", template.system_prompt, BASE_SYSTEM_PROMPT),
        None => BASE_SYSTEM_PROMPT.to_string(),
    }
}

pub fn build_user_message(original_prompt: &str, context: &EnhancementContext) -> String {
    let mut message = format!("Original Prompt:\n\"{}\"\n\n", original_prompt);

    let fields = [
        ("User's Goal", context.goal.as_deref()),
        ("Experience Level", context.experience_level.as_deref()),
        ("Domain", context.domain.as_deref()),
        ("Template", context.template.as_deref()),
    ];

    let mut any_field = false;
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            message.push_str(&format!("{}: {}\n", label, value));
            any_field = true;
        }
    }
    if any_field {
        message.push('\n');
    }

    message.push_str(CLOSING_INSTRUCTION);
    message
}
