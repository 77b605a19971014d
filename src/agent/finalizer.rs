//! Answer finalization agent.
//!
//! Joins all research branches' annotated text, synthesizes the final
//! answer with one LLM call, then restores short-URL tokens to their
//! original URLs and drops sources the synthesis never cited.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::provider::LlmProvider;
use super::state::SourceRecord;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Separator between per-branch research texts in the synthesis prompt.
pub const RESEARCH_SEPARATOR: &str = "\n---\n\n";

/// Agent that synthesizes the final cited answer.
pub struct FinalizerAgent {
    model: String,
    max_retries: u32,
}

impl FinalizerAgent {
    /// Creates a new finalizer agent.
    ///
    /// `model` is resolved by the orchestrator: the per-request
    /// `reasoning_model` override when present, otherwise the configured
    /// answer model.
    #[must_use]
    pub fn new(config: &AgentConfig, model: String) -> Self {
        Self {
            model,
            max_retries: config.max_retries,
        }
    }

    /// Executes the synthesis call and post-processes citations.
    ///
    /// Returns the final answer text plus the filtered source list.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on transport failure.
    pub async fn finalize(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
        sources_gathered: &[SourceRecord],
    ) -> Result<(String, Vec<SourceRecord>, AgentResponse), AgentError> {
        let response = self.execute(provider, prompt).await?;
        let (answer, sources) = restore_sources(&response.content, sources_gathered);
        Ok((answer, sources, response))
    }
}

/// Replaces short-URL tokens with their original URLs and filters the
/// source list to those actually cited.
///
/// A record is kept exactly when its token occurs in the raw synthesized
/// text; every occurrence is then replaced with the original URL, so a
/// kept record's token never survives in the output.
#[must_use]
pub fn restore_sources(text: &str, sources: &[SourceRecord]) -> (String, Vec<SourceRecord>) {
    // Keep/drop decisions run against the raw synthesized text.
    let cited: Vec<SourceRecord> = sources
        .iter()
        .filter(|s| text.contains(&s.short_url))
        .cloned()
        .collect();

    // Replace longer tokens first: `…/0-1` is a prefix of `…/0-10` and
    // must not clobber it.
    let mut by_len: Vec<&SourceRecord> = cited.iter().collect();
    by_len.sort_by(|a, b| b.short_url.len().cmp(&a.short_url.len()));

    let mut restored = text.to_string();
    for source in by_len {
        restored = restored.replace(&source.short_url, &source.value);
    }

    (restored, cited)
}

#[async_trait]
impl Agent for FinalizerAgent {
    fn name(&self) -> &'static str {
        "finalizer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        0.0
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
