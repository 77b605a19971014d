//! Web research agent.
//!
//! Runs one search-grounded LLM call per [`WebSearchUnit`] and converts
//! the grounding metadata into citation-annotated text plus source
//! records. There is no retry wrapper: a transport failure on any
//! branch fails the whole run. Malformed or absent grounding metadata
//! degrades to uncited text instead of failing the branch.

use async_trait::async_trait;
use tracing::debug;

use super::citations::{collect_sources, get_citations, insert_citation_markers, resolve_urls};
use super::config::AgentConfig;
use super::provider::LlmProvider;
use super::state::{ResearchDelta, WebSearchUnit};
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Agent that researches one query with the provider's web-search tool.
pub struct WebResearchAgent {
    model: String,
}

impl WebResearchAgent {
    /// Creates a new research agent from configuration.
    ///
    /// Research shares the query generator's model.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.query_generator_model.clone(),
        }
    }

    /// Executes the research call and builds the branch's state delta.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on transport failure.
    pub async fn research(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
        unit: &WebSearchUnit,
    ) -> Result<(ResearchDelta, AgentResponse), AgentError> {
        let response = self.execute(provider, prompt).await?;
        let delta = Self::build_delta(&response, unit);
        Ok((delta, response))
    }

    /// Converts a research response into a partial state update.
    ///
    /// With grounding metadata: sources are resolved to short-URL tokens
    /// scoped by the unit's index and markers are inserted into the
    /// text. Without it, the text passes through with an empty source
    /// list.
    fn build_delta(response: &AgentResponse, unit: &WebSearchUnit) -> ResearchDelta {
        let (annotated, sources) = match &response.grounding {
            Some(grounding) if !grounding.is_empty() => {
                let resolved = resolve_urls(&grounding.chunks, unit.id);
                let citations = get_citations(grounding, &resolved);
                let annotated = insert_citation_markers(&response.content, &citations);
                (annotated, collect_sources(&citations))
            }
            _ => {
                debug!(unit = unit.id, "no grounding metadata, passing text through");
                (response.content.clone(), Vec::new())
            }
        };

        ResearchDelta {
            sources_gathered: sources,
            search_query: vec![unit.search_query.clone()],
            web_research_result: vec![annotated],
        }
    }
}

#[async_trait]
impl Agent for WebResearchAgent {
    fn name(&self) -> &'static str {
        "web_research"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        0.0
    }

    fn enable_search(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::citations::SHORT_URL_PREFIX;
    use crate::agent::message::{GroundingChunk, GroundingMetadata, GroundingSupport, TokenUsage};

    fn unit(query: &str, id: usize) -> WebSearchUnit {
        WebSearchUnit {
            search_query: query.to_string(),
            id,
        }
    }

    fn grounded_response(text: &str) -> AgentResponse {
        AgentResponse {
            content: text.to_string(),
            grounding: Some(GroundingMetadata {
                chunks: vec![GroundingChunk {
                    uri: "https://luatvietnam.vn/bai-viet".to_string(),
                    title: "luatvietnam.vn".to_string(),
                }],
                supports: vec![GroundingSupport {
                    start_index: 0,
                    end_index: text.len(),
                    chunk_indices: vec![0],
                }],
            }),
            usage: TokenUsage::default(),
        }
    }

    #[test]
    fn test_build_delta_with_grounding() {
        let response = grounded_response("Phí trước bạ là 2%.");
        let delta = WebResearchAgent::build_delta(&response, &unit("lệ phí trước bạ", 1));

        assert_eq!(delta.search_query, vec!["lệ phí trước bạ"]);
        assert_eq!(delta.web_research_result.len(), 1);
        let annotated = &delta.web_research_result[0];
        assert!(annotated.contains(&format!("[luatvietnam]({SHORT_URL_PREFIX}/1-0)")));
        assert_eq!(delta.sources_gathered.len(), 1);
        assert_eq!(
            delta.sources_gathered[0].value,
            "https://luatvietnam.vn/bai-viet"
        );
    }

    #[test]
    fn test_build_delta_without_grounding() {
        let response = AgentResponse {
            content: "Không tìm thấy nguồn.".to_string(),
            grounding: None,
            usage: TokenUsage::default(),
        };
        let delta = WebResearchAgent::build_delta(&response, &unit("truy vấn", 0));

        assert_eq!(delta.web_research_result, vec!["Không tìm thấy nguồn."]);
        assert!(delta.sources_gathered.is_empty());
        assert_eq!(delta.search_query, vec!["truy vấn"]);
    }

    #[test]
    fn test_build_delta_empty_grounding_passes_through() {
        let response = AgentResponse {
            content: "text".to_string(),
            grounding: Some(GroundingMetadata::default()),
            usage: TokenUsage::default(),
        };
        let delta = WebResearchAgent::build_delta(&response, &unit("q", 2));
        assert_eq!(delta.web_research_result, vec!["text"]);
        assert!(delta.sources_gathered.is_empty());
    }

    #[test]
    fn test_parallel_units_never_collide() {
        let a = WebResearchAgent::build_delta(&grounded_response("A."), &unit("qa", 0));
        let b = WebResearchAgent::build_delta(&grounded_response("B."), &unit("qb", 1));
        assert_ne!(
            a.sources_gathered[0].short_url,
            b.sources_gathered[0].short_url
        );
    }

    #[test]
    fn test_agent_properties() {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let agent = WebResearchAgent::new(&config);
        assert_eq!(agent.name(), "web_research");
        assert!(agent.enable_search());
        assert!(!agent.json_mode());
        assert_eq!(agent.max_retries(), 0);
    }
}
