//! CompletionProvider trait — the abstraction over conversational LLM
//! backends.
//!
//! A provider takes the recent conversation plus a system prompt (which
//! embeds the assembled market context) and returns generated text, or
//! `None` when the backend produced nothing usable. Transport-level
//! failures surface as [`ProviderError`]; callers treat both the same way
//! and fall back to a templated reply.

use crate::error::ProviderError;
use crate::message::ChatMessage;
use async_trait::async_trait;

/// A conversational text-generation endpoint.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// A human-readable name for this provider (e.g. "groq").
    fn name(&self) -> &str;

    /// Send a conversation and get generated text back.
    ///
    /// `history` is role-tagged and already capped by the caller; the
    /// system prompt is prepended by the implementation.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport or API failures. A successful
    /// call with no usable text returns `Ok(None)`.
    async fn complete(
        &self,
        history: &[ChatMessage],
        system_prompt: &str,
        max_tokens: u32,
    ) -> Result<Option<String>, ProviderError>;
}
