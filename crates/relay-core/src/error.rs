//! Error Types

use thiserror::Error;

/// Result type alias for completion operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Completion relay error types
#[derive(Error, Debug)]
pub enum RelayError {
    /// Upstream provider returned an error status or failed mid-request
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unreachable
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered, but without a usable completion
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Request input rejected before reaching the provider
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl RelayError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::MalformedResponse(_) => "OpenAI response failed.".into(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::Auth(_) => "The AI service rejected the relay credentials.".into(),
            _ => "Internal server error".into(),
        }
    }
}
