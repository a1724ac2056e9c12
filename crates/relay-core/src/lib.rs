//! # relay-core
//!
//! Provider-agnostic completion types for the privacy relay.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   PolicyAnalyst                      │
//! │  ┌──────────────────┐      ┌─────────────────────┐   │
//! │  │  System prompt + │─────▶│   LlmProvider       │   │
//! │  │  selected text   │      │   (Strategy)        │   │
//! │  └──────────────────┘      └─────────────────────┘   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the relay swap the hosted completion API
//! (or a fake in tests) without touching request handling.

pub mod analysis;
pub mod error;
pub mod message;
pub mod provider;

pub use analysis::{PolicyAnalyst, PRIVACY_ANALYST_PROMPT};
pub use error::{RelayError, Result};
pub use message::{Message, Role};
pub use provider::LlmProvider;
