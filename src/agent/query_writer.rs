//! Query-generation agent.
//!
//! Produces a batch of web-search queries from the user's question via a
//! single structured LLM call at exploratory temperature. The provider
//! retries transport failures up to the configured budget.

use async_trait::async_trait;
use tracing::warn;

use super::config::AgentConfig;
use super::provider::LlmProvider;
use super::state::SearchQueryBatch;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Agent that generates search queries for the research fan-out.
pub struct QueryWriterAgent {
    model: String,
    max_retries: u32,
}

impl QueryWriterAgent {
    /// Creates a new query-writer agent from configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.query_generator_model.clone(),
            max_retries: config.max_retries,
        }
    }

    /// Executes the agent and parses the query batch.
    ///
    /// The model is instructed, not enforced, to respect the requested
    /// count; the result is hard-truncated to `number_queries`
    /// defensively.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ResponseParse`] if the response is not a
    /// valid batch, or [`AgentError::Orchestration`] if the batch is
    /// empty after truncation.
    pub async fn generate(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
        number_queries: usize,
    ) -> Result<(SearchQueryBatch, AgentResponse), AgentError> {
        let response = self.execute(provider, prompt).await?;
        let mut batch = Self::parse_batch(&response.content)?;

        if batch.query.len() > number_queries {
            warn!(
                generated = batch.query.len(),
                requested = number_queries,
                "query batch exceeds requested count, truncating"
            );
            batch.query.truncate(number_queries);
        }

        if batch.query.is_empty() {
            return Err(AgentError::Orchestration {
                message: "Query generator returned an empty batch".to_string(),
            });
        }

        Ok((batch, response))
    }

    /// Parses the agent's JSON response into a query batch.
    fn parse_batch(content: &str) -> Result<SearchQueryBatch, AgentError> {
        let trimmed = content.trim();

        // Handle markdown code blocks
        let json_str = if trimmed.starts_with("```") {
            trimmed
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim()
        } else {
            trimmed
        };

        serde_json::from_str::<SearchQueryBatch>(json_str).map_err(|e| {
            AgentError::ResponseParse {
                message: format!("Failed to parse query batch: {e}"),
                content: content.to_string(),
            }
        })
    }
}

#[async_trait]
impl Agent for QueryWriterAgent {
    fn name(&self) -> &'static str {
        "query_writer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn json_mode(&self) -> bool {
        true
    }

    // Exploratory: query diversity matters more than determinism here.
    fn temperature(&self) -> f32 {
        1.0
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
