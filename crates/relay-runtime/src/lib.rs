//! # relay-runtime
//!
//! Runtime providers for the privacy relay.
//!
//! ## Providers
//!
//! - **OpenAI** (default): hosted chat completions, or any endpoint that
//!   speaks the same `/chat/completions` protocol via `OPENAI_BASE_URL`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_runtime::OpenAiProvider;
//!
//! let config = OpenAiConfig::from_lookup(|key| std::env::var(key).ok())?;
//! let provider = Arc::new(OpenAiProvider::from_config(config)?);
//! let analyst = PolicyAnalyst::new(provider, GenerationOptions::default());
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use relay_core::{LlmProvider, Message, PolicyAnalyst, RelayError, Result, Role};
