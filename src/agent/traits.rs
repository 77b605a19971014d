//! Agent trait definition.
//!
//! All pipeline steps that call the LLM (classifier, query writer, web
//! researcher, finalizer) implement this trait, which provides a uniform
//! interface for the orchestrator. The pure steps (router, refusal,
//! dispatcher) are plain functions and do not appear here.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, GroundingMetadata, TokenUsage};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Grounding metadata from a search-enabled call, if any.
    pub grounding: Option<GroundingMetadata>,
    /// Token usage for this call.
    pub usage: TokenUsage,
}

/// Trait implemented by all LLM-calling steps in the pipeline.
///
/// Agents encapsulate a specific role with a fixed prompt shape, model,
/// and sampling configuration. The orchestrator calls
/// [`Agent::execute`] to run the agent against a provider.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature (0.0 = deterministic-leaning).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Whether to run with the provider's hosted web-search tool.
    fn enable_search(&self) -> bool {
        false
    }

    /// Additional transport-level attempts after the first.
    ///
    /// Zero by default: only the query-generation and finalization
    /// steps carry a retry budget.
    fn max_retries(&self) -> u32 {
        0
    }

    /// Executes the agent with the given formatted prompt.
    ///
    /// Builds a [`ChatRequest`] from the agent's configuration and
    /// delegates to the provider.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or response parsing errors.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
    ) -> Result<AgentResponse, AgentError> {
        let request = ChatRequest {
            model: self.model().to_string(),
            prompt: prompt.to_string(),
            temperature: self.temperature(),
            json_mode: self.json_mode(),
            enable_search: self.enable_search(),
            max_retries: self.max_retries(),
        };

        let response: ChatResponse = provider.chat(&request).await?;

        Ok(AgentResponse {
            content: response.content,
            grounding: response.grounding,
            usage: response.usage,
        })
    }
}
