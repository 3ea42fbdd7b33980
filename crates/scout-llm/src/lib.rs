//! Generative-text provider abstraction for stock-scout
//!
//! This crate provides provider-agnostic types for asking a hosted language
//! model to turn a prompt into prose. It includes:
//!
//! - Message types for the conversation sent to the model
//! - Completion request/response types
//! - The `LLMProvider` trait implemented by concrete backends
//! - A Google Gemini backend (behind the `gemini` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;
