//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for generative-text providers
///
/// Implementations turn a prompt into prose through a hosted model. Callers
/// treat the provider as an opaque collaborator: any error is a reason to
/// fall back, never a reason to abort.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the model
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "gemini")
    fn name(&self) -> &str;
}
