//! Privacy Policy Analyst
//!
//! Wraps an `LlmProvider` with the fixed analyst instruction. The selected
//! text is forwarded as the single user message and the provider's first
//! completion is returned verbatim.

use std::sync::Arc;

use crate::error::{RelayError, Result};
use crate::message::Message;
use crate::provider::{GenerationOptions, LlmProvider};

/// System instruction sent ahead of every analysis request
pub const PRIVACY_ANALYST_PROMPT: &str = "You are a privacy policy analyst. Break down privacy \
agreements into clear pros, cons, and red flags using bullet points or headers. Be detailed and \
unbiased.";

/// Forwards selected policy text to a completion provider
pub struct PolicyAnalyst {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl PolicyAnalyst {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self {
            provider,
            options,
        }
    }

    /// Summarize a privacy agreement excerpt.
    ///
    /// An empty completion counts as a malformed response, the same as a
    /// response with no choices at all.
    pub async fn summarize(&self, selected_text: &str) -> Result<String> {
        if selected_text.is_empty() {
            return Err(RelayError::InvalidInput("Missing selectedText".into()));
        }

        let messages = [
            Message::system(PRIVACY_ANALYST_PROMPT),
            Message::user(selected_text),
        ];

        let completion = self.provider.complete(&messages, &self.options).await?;

        if completion.content.is_empty() {
            return Err(RelayError::MalformedResponse(
                "completion contained no text".into(),
            ));
        }

        tracing::debug!(
            provider = self.provider.name(),
            model = %completion.model,
            chars = completion.content.len(),
            "Policy analysis completed"
        );

        Ok(completion.content)
    }
}
