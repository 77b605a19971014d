//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific API calls. This keeps all pipeline logic decoupled
//! from any particular LLM vendor and makes every step testable with an
//! injected fake.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// Trait for LLM provider backends.
///
/// Implementations handle the transport layer (HTTP, retries, timeouts)
/// for a specific provider while presenting a uniform interface to the
/// pipeline steps. A request with `enable_search` set must run with the
/// provider's hosted web-search tool and surface grounding metadata in
/// the response when the tool retrieved sources.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"gemini"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// The provider honors `request.max_retries` for transport-level
    /// failures; parse failures are never retried.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures, timeouts, or malformed
    /// response bodies.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}
