use super::response::ExtractError;
use crate::llm::BackendError;
use crate::templates::TemplateNotFound;
use thiserror::Error;

/// Errors that abort an enhancement
///
/// Cost log write failures are not represented here: they are reported as
/// warnings and never change the outcome of an enhancement.
#[derive(Debug, Error)]
pub enum EnhanceError {
    /// No API credential was configured
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingCredential,

    #[error(transparent)]
    TemplateNotFound(#[from] TemplateNotFound),

    /// The completion API call failed
    #[error("Prompt enhancement failed: {0}")]
    ApiCallFailed(#[from] BackendError),

    /// No JSON object could be recovered from the model output
    #[error("Prompt enhancement failed: {0}")]
    ResponseParseError(String),

    /// JSON was found but does not have the expected shape
    #[error("Prompt enhancement failed: response does not match the expected schema: {0}")]
    SchemaMismatch(String),
}

impl From<ExtractError> for EnhanceError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::SchemaMismatch(reason) => EnhanceError::SchemaMismatch(reason),
            other => EnhanceError::ResponseParseError(other.to_string()),
        }
    }
}

impl EnhanceError {
    /// Returns a user-friendly error message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            EnhanceError::MissingCredential => "Error: ANTHROPIC_API_KEY environment variable not set\n\n\
                Help: Set it with:\n\
                export ANTHROPIC_API_KEY=\"your-key\"\n\n\
                The key can also be placed in a .env file in the working directory."
                .to_string(),
            EnhanceError::TemplateNotFound(err) => {
                format!(
                    "Error: {}\n\n\
                    Help: List the templates with: prompt-enhancer --list-templates",
                    err
                )
            }
            EnhanceError::ApiCallFailed(backend) => match backend {
                BackendError::AuthenticationError { message } => format!(
                    "Error: Anthropic API rejected the credential\n\n\
                    Help: Check that ANTHROPIC_API_KEY holds a valid, active key.\n\
                    Get a key: https://console.anthropic.com/\n\n\
                    Details: {}",
                    message
                ),
                BackendError::RateLimitError { .. } => format!(
                    "Error: {}\n\n\
                    Help: Wait a moment and run the command again.",
                    backend
                ),
                BackendError::TimeoutError { seconds } => format!(
                    "Error: Request timed out after {} seconds\n\n\
                    Help: Raise PROMPT_ENHANCER_REQUEST_TIMEOUT or unset it to wait indefinitely.",
                    seconds
                ),
                BackendError::NetworkError { message } => format!(
                    "Error: Cannot reach the Anthropic API\n\n\
                    Help: Check your network connection and ANTHROPIC_BASE_URL.\n\n\
                    Details: {}",
                    message
                ),
                other => format!("Error: {}", other),
            },
            EnhanceError::ResponseParseError(reason) => format!(
                "Error: Could not read the model response\n\n\
                Help: The model did not return the expected JSON. Running the command again \
                usually succeeds.\n\n\
                Details: {}",
                reason
            ),
            EnhanceError::SchemaMismatch(reason) => format!(
                "Error: The model response has an unexpected shape\n\n\
                Help: Running the command again usually succeeds.\n\n\
                Details: {}",
                reason
            ),
        }
    }
}
