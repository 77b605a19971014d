//! Orchestrator for the classify → research → synthesize workflow.
//!
//! Coordinates the full pipeline: classification, routing, query
//! generation, parallel web research (fan-out/join), and answer
//! finalization. Parallel branches return local [`ResearchDelta`]s that
//! a single coordinator merges after the join; no state is shared
//! mutably across tasks.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use super::classifier::ClassifierAgent;
use super::config::AgentConfig;
use super::finalizer::{FinalizerAgent, RESEARCH_SEPARATOR};
use super::message::{ChatMessage, TokenUsage};
use super::prompt::{
    PromptSet, build_answer_prompt, build_classification_prompt, build_query_writer_prompt,
    build_web_searcher_prompt, current_date,
};
use super::provider::LlmProvider;
use super::query_writer::QueryWriterAgent;
use super::researcher::WebResearchAgent;
use super::router::{NextStep, decide_next_step, handle_non_legal_question};
use super::state::{OverallState, ResearchDelta, RunResult, WebSearchUnit, research_topic};
use crate::core::Classification;
use crate::error::AgentError;

/// Maximum research topic length in bytes.
const MAX_TOPIC_LEN: usize = 10_000;

/// Turns the generated queries into independent parallel work units.
///
/// Pure function: one [`WebSearchUnit`] per query, tagged with its
/// zero-based position. The tag is the sole correlation key keeping
/// short-URL tokens from colliding across branches.
#[must_use]
pub fn dispatch_research(queries: &[String]) -> Vec<WebSearchUnit> {
    queries
        .iter()
        .enumerate()
        .map(|(id, search_query)| WebSearchUnit {
            search_query: search_query.clone(),
            id,
        })
        .collect()
}

/// Per-request overrides for workflow parameters.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Override the generated query count for this request.
    pub initial_search_query_count: Option<usize>,
    /// Override the finalization model for this request.
    pub reasoning_model: Option<String>,
}

/// Orchestrates the research workflow.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates a new orchestrator with the given provider and configuration.
    ///
    /// Loads prompt templates from the directory specified in
    /// [`AgentConfig::prompt_dir`], falling back to compiled-in defaults.
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self {
            provider,
            config,
            prompts,
        }
    }

    /// Executes the full workflow for one conversation.
    ///
    /// # Steps
    ///
    /// 1. Classify the question
    /// 2. Route: refusal (terminal) or research
    /// 3. Generate search queries
    /// 4. Fan out one research task per query, join all
    /// 5. Merge branch deltas and synthesize the final answer
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on empty input or any LLM call failure.
    /// A failed research branch fails the whole run; there is no
    /// partial answer.
    pub async fn run(
        &self,
        messages: Vec<ChatMessage>,
        overrides: Option<RunOverrides>,
    ) -> Result<RunResult, AgentError> {
        let start = Instant::now();
        let overrides = overrides.unwrap_or_default();

        if messages.is_empty() {
            return Err(AgentError::Orchestration {
                message: "Conversation cannot be empty".to_string(),
            });
        }

        let mut state = OverallState::new(messages);
        state.initial_search_query_count = overrides.initial_search_query_count;
        state.reasoning_model = overrides.reasoning_model;

        let topic = research_topic(&state.messages);
        if topic.trim().is_empty() {
            return Err(AgentError::Orchestration {
                message: "Question cannot be empty".to_string(),
            });
        }
        if topic.len() > MAX_TOPIC_LEN {
            return Err(AgentError::Orchestration {
                message: format!(
                    "Question exceeds maximum length ({} bytes, max {MAX_TOPIC_LEN})",
                    topic.len()
                ),
            });
        }

        let mut usage = TokenUsage::default();

        // Step 1: Classify
        let classifier = ClassifierAgent::new(&self.config);
        let prompt = build_classification_prompt(&self.prompts.classification, &topic);
        let (verdict, response) = classifier.classify(&*self.provider, &prompt).await?;
        usage.accumulate(response.usage);
        state.is_legal_question = Classification::from_verdict(verdict.is_legal_question);
        info!(
            classification = %state.is_legal_question,
            reason = verdict.reason,
            "question classified"
        );

        // Step 2: Route
        if decide_next_step(state.is_legal_question) == NextStep::HandleNonLegal {
            let refusal = handle_non_legal_question();
            return Ok(RunResult {
                answer: refusal.content,
                classification: state.is_legal_question,
                search_queries: Vec::new(),
                sources: Vec::new(),
                usage,
                elapsed: start.elapsed(),
            });
        }

        // Step 3: Generate queries. An unset count is filled from
        // configuration before use (scalar overwrite).
        if state.initial_search_query_count.is_none() {
            state.initial_search_query_count = Some(self.config.number_of_initial_queries);
        }
        let number_queries = state
            .initial_search_query_count
            .unwrap_or(self.config.number_of_initial_queries);

        let date = current_date();
        let writer = QueryWriterAgent::new(&self.config);
        let prompt =
            build_query_writer_prompt(&self.prompts.query_writer, &date, &topic, number_queries);
        let (batch, response) = writer
            .generate(&*self.provider, &prompt, number_queries)
            .await?;
        usage.accumulate(response.usage);
        debug!(
            count = batch.query.len(),
            rationale = batch.rationale,
            "search queries generated"
        );

        // Step 4: Fan out research, one task per query
        let units = dispatch_research(&batch.query);
        let deltas = self.fan_out(units, &date).await?;
        for (delta, task_usage) in deltas {
            state.absorb(delta);
            usage.accumulate(task_usage);
        }

        // Step 5: Synthesize the final answer
        let summaries = state.web_research_result.join(RESEARCH_SEPARATOR);
        let model = state
            .reasoning_model
            .clone()
            .unwrap_or_else(|| self.config.answer_model.clone());
        let finalizer = FinalizerAgent::new(&self.config, model);
        let prompt = build_answer_prompt(&self.prompts.answer, &topic, &summaries);
        let (answer, sources, response) = finalizer
            .finalize(&*self.provider, &prompt, &state.sources_gathered)
            .await?;
        usage.accumulate(response.usage);
        info!(
            sources = sources.len(),
            queries = state.search_query.len(),
            "answer finalized"
        );

        Ok(RunResult {
            answer,
            classification: state.is_legal_question,
            search_queries: state.search_query,
            sources,
            usage,
            elapsed: start.elapsed(),
        })
    }

    /// Fans research tasks out concurrently and joins all of them.
    ///
    /// Results arrive in completion order, not submission order. The
    /// join is an unconditional barrier: every branch must finish, and
    /// any branch error fails the whole run.
    async fn fan_out(
        &self,
        units: Vec<WebSearchUnit>,
        date: &str,
    ) -> Result<Vec<(ResearchDelta, TokenUsage)>, AgentError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks: JoinSet<Result<(ResearchDelta, TokenUsage), AgentError>> = JoinSet::new();

        for unit in units {
            let sem = Arc::clone(&semaphore);
            let provider = Arc::clone(&self.provider);
            let config = self.config.clone();
            let template = self.prompts.web_searcher.clone();
            let date = date.to_string();

            tasks.spawn(async move {
                let _permit = sem.acquire().await.map_err(|e| AgentError::Orchestration {
                    message: format!("Semaphore acquire failed: {e}"),
                })?;

                let agent = WebResearchAgent::new(&config);
                let prompt = build_web_searcher_prompt(&template, &date, &unit.search_query);
                debug!(unit = unit.id, query = unit.search_query, "research started");
                let (delta, response) = agent.research(&*provider, &prompt, &unit).await?;
                Ok((delta, response.usage))
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(|e| AgentError::Orchestration {
                message: format!("Task join failed: {e}"),
            })?;
            results.push(result?);
        }

        Ok(results)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
