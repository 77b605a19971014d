//! Workflow state and data types carried through the pipeline.
//!
//! Everything here is transient and in-memory: state is created at
//! workflow entry, mutated by per-step partial updates (list-valued
//! fields append, scalar fields overwrite), and dropped when the run
//! terminates. Nothing persists across runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, Role, TokenUsage};
use crate::core::Classification;

/// Overall conversation state threaded through the workflow.
///
/// Parallel research branches never write here directly: each branch
/// returns a [`ResearchDelta`] and a single coordinator merges them
/// after the join via [`OverallState::absorb`].
#[derive(Debug, Clone, Default)]
pub struct OverallState {
    /// Ordered conversation turns.
    pub messages: Vec<ChatMessage>,
    /// Result of the classification step.
    pub is_legal_question: Classification,
    /// Per-request override for the generated query count.
    pub initial_search_query_count: Option<usize>,
    /// Per-request override for the finalization model.
    pub reasoning_model: Option<String>,
    /// Queries executed so far (appended per branch).
    pub search_query: Vec<String>,
    /// Source records gathered across all branches.
    pub sources_gathered: Vec<SourceRecord>,
    /// One annotated research text per completed branch, in completion
    /// order. Callers must not assume positional correspondence with
    /// `search_query`.
    pub web_research_result: Vec<String>,
}

impl OverallState {
    /// Creates workflow state from the incoming conversation.
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Merges one research branch's partial update: list fields append.
    pub fn absorb(&mut self, delta: ResearchDelta) {
        self.sources_gathered.extend(delta.sources_gathered);
        self.search_query.extend(delta.search_query);
        self.web_research_result.extend(delta.web_research_result);
    }
}

/// Extracts the research topic from the conversation turns.
///
/// A single-turn conversation yields that turn's text directly; longer
/// conversations are flattened into `role: text` lines so the prompt
/// keeps the dialogue context.
#[must_use]
pub fn research_topic(messages: &[ChatMessage]) -> String {
    match messages {
        [only] => only.content.clone(),
        many => {
            let mut topic = String::new();
            for msg in many {
                let role = match msg.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                topic.push_str(role);
                topic.push_str(": ");
                topic.push_str(&msg.content);
                topic.push('\n');
            }
            topic
        }
    }
}

/// Structured output of the query generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQueryBatch {
    /// Generated search queries.
    pub query: Vec<String>,
    /// Brief explanation of why these queries fit the topic.
    #[serde(default)]
    pub rationale: String,
}

/// One unit of parallel research work.
///
/// The `id` is the query's zero-based position from the dispatcher and
/// the sole correlation key keeping short-URL tokens collision-free
/// across branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSearchUnit {
    /// The query to research.
    pub search_query: String,
    /// Zero-based position in the generated batch.
    pub id: usize,
}

/// A byte span `[start, end)` in a research text where a source is cited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start of the cited span.
    pub start: usize,
    /// End of the cited span (exclusive).
    pub end: usize,
}

/// A web source cited in research output.
///
/// `short_url` is a synthetic deterministic token substituted into the
/// text to reduce token cost; the finalizer restores `value` and keeps
/// only records whose token actually occurs in the synthesized answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Display label (source title with its final dot-segment dropped).
    pub label: String,
    /// Synthetic short-URL token, unique within a run.
    pub short_url: String,
    /// The original resolvable URL.
    pub value: String,
    /// Spans in the branch's original text where this source is cited.
    pub segments: Vec<Span>,
}

/// Partial state produced by one research branch.
///
/// The echoed `search_query` is intentionally redundant with the
/// generator's output; it lets the finalizer reconstruct per-branch
/// identity after the unordered merge.
#[derive(Debug, Clone, Default)]
pub struct ResearchDelta {
    /// Sources cited by this branch.
    pub sources_gathered: Vec<SourceRecord>,
    /// Singleton list echoing the branch's query.
    pub search_query: Vec<String>,
    /// Singleton list with the citation-annotated research text.
    pub web_research_result: Vec<String>,
}

/// Final result of one workflow run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// The final assistant answer (refusal or synthesized response).
    pub answer: String,
    /// Classification the router acted on.
    pub classification: Classification,
    /// Queries that were generated and researched.
    pub search_queries: Vec<String>,
    /// Sources actually cited in the final answer.
    pub sources: Vec<SourceRecord>,
    /// Token usage accumulated across all LLM calls.
    pub usage: TokenUsage,
    /// Total elapsed time.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::{assistant_message, user_message};

    #[test]
    fn test_research_topic_single_turn() {
        let messages = vec![user_message("Thủ tục sang tên xe máy thế nào?")];
        assert_eq!(research_topic(&messages), "Thủ tục sang tên xe máy thế nào?");
    }

    #[test]
    fn test_research_topic_multi_turn() {
        let messages = vec![
            user_message("Mua đất cần giấy tờ gì?"),
            assistant_message("Cần sổ đỏ và hợp đồng công chứng."),
            user_message("Phí công chứng bao nhiêu?"),
        ];
        let topic = research_topic(&messages);
        assert!(topic.contains("user: Mua đất cần giấy tờ gì?"));
        assert!(topic.contains("assistant: Cần sổ đỏ và hợp đồng công chứng."));
        assert!(topic.contains("user: Phí công chứng bao nhiêu?"));
    }

    #[test]
    fn test_absorb_appends_lists() {
        let mut state = OverallState::new(vec![user_message("q")]);
        state.absorb(ResearchDelta {
            sources_gathered: vec![SourceRecord {
                label: "luatvietnam".to_string(),
                short_url: "https://vertexaisearch.cloud.google.com/id/0-0".to_string(),
                value: "https://luatvietnam.vn/a".to_string(),
                segments: vec![Span { start: 0, end: 4 }],
            }],
            search_query: vec!["query a".to_string()],
            web_research_result: vec!["text a".to_string()],
        });
        state.absorb(ResearchDelta {
            sources_gathered: Vec::new(),
            search_query: vec!["query b".to_string()],
            web_research_result: vec!["text b".to_string()],
        });
        assert_eq!(state.search_query, vec!["query a", "query b"]);
        assert_eq!(state.web_research_result, vec!["text a", "text b"]);
        assert_eq!(state.sources_gathered.len(), 1);
    }

    #[test]
    fn test_search_query_batch_deserialization() {
        let json = r#"{"query": ["thủ tục sang tên xe máy 2025"], "rationale": "mới nhất"}"#;
        let batch: SearchQueryBatch = serde_json::from_str(json).unwrap_or_else(|_| unreachable!());
        assert_eq!(batch.query.len(), 1);
        assert_eq!(batch.rationale, "mới nhất");
    }

    #[test]
    fn test_search_query_batch_missing_rationale() {
        let json = r#"{"query": ["a", "b"]}"#;
        let batch: SearchQueryBatch = serde_json::from_str(json).unwrap_or_else(|_| unreachable!());
        assert_eq!(batch.query.len(), 2);
        assert!(batch.rationale.is_empty());
    }
}
