//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment and entitlement errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    WebhookSignature(String),

    /// Verified webhook payload could not be parsed
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Completed checkout carried no customer email
    #[error("Missing email")]
    MissingEmail,

    /// Record store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Get user-friendly message
    pub const fn user_message(&self) -> &str {
        match self {
            Self::Stripe(_) => "Failed to create checkout session",
            Self::WebhookSignature(_) | Self::WebhookParse(_) => "Webhook Error",
            Self::MissingEmail => "Missing email",
            Self::Storage(_) => "Failed to store Pro user",
            Self::Config(_) => "Service configuration error.",
        }
    }

    /// Whether the fault lies with the incoming request rather than a
    /// collaborator
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::WebhookSignature(_) | Self::WebhookParse(_) | Self::MissingEmail
        )
    }
}
