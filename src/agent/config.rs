//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! Loaded once at startup into an immutable value passed to every component;
//! no component reads the environment at call time.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default number of search queries generated per question.
const DEFAULT_INITIAL_QUERIES: usize = 3;
/// Default maximum concurrent research calls.
const DEFAULT_MAX_CONCURRENCY: usize = 10;
/// Default retry budget for the query-generation and finalization calls.
/// Classification and per-unit research calls are never retried.
const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default classifier model. The classification step is pinned to a fast
/// model regardless of the generation/answer overrides.
const DEFAULT_CLASSIFIER_MODEL: &str = "gemini-2.0-flash";
/// Default model for query generation and web research.
const DEFAULT_QUERY_GENERATOR_MODEL: &str = "gemini-2.0-flash";
/// Default model for answer finalization.
const DEFAULT_ANSWER_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the research agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "gemini").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the classification step.
    pub classifier_model: String,
    /// Model for query generation and web research.
    pub query_generator_model: String,
    /// Model for answer finalization. Overridable per request via the
    /// `reasoning_model` run override.
    pub answer_model: String,
    /// Number of search queries to generate per question.
    pub number_of_initial_queries: usize,
    /// Maximum concurrent research calls.
    pub max_concurrency: usize,
    /// Retry budget for generation and finalization calls.
    pub max_retries: u32,
    /// Request timeout.
    pub timeout: Duration,
    /// Directory containing prompt template files.
    ///
    /// When set, the pipeline loads prompts from markdown files in this
    /// directory, falling back to compiled-in defaults for any missing
    /// files.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    classifier_model: Option<String>,
    query_generator_model: Option<String>,
    answer_model: Option<String>,
    number_of_initial_queries: Option<usize>,
    max_concurrency: Option<usize>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("GEMINI_API_KEY").ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("PHAPLY_BASE_URL").ok();
        }
        if self.classifier_model.is_none() {
            self.classifier_model = std::env::var("PHAPLY_CLASSIFIER_MODEL").ok();
        }
        if self.query_generator_model.is_none() {
            self.query_generator_model = std::env::var("PHAPLY_QUERY_MODEL").ok();
        }
        if self.answer_model.is_none() {
            self.answer_model = std::env::var("PHAPLY_ANSWER_MODEL").ok();
        }
        if self.number_of_initial_queries.is_none() {
            self.number_of_initial_queries = std::env::var("PHAPLY_INITIAL_QUERIES")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.max_concurrency.is_none() {
            self.max_concurrency = std::env::var("PHAPLY_MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("PHAPLY_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the classifier model.
    #[must_use]
    pub fn classifier_model(mut self, model: impl Into<String>) -> Self {
        self.classifier_model = Some(model.into());
        self
    }

    /// Sets the query generator / research model.
    #[must_use]
    pub fn query_generator_model(mut self, model: impl Into<String>) -> Self {
        self.query_generator_model = Some(model.into());
        self
    }

    /// Sets the answer finalization model.
    #[must_use]
    pub fn answer_model(mut self, model: impl Into<String>) -> Self {
        self.answer_model = Some(model.into());
        self
    }

    /// Sets the number of initial search queries.
    #[must_use]
    pub const fn number_of_initial_queries(mut self, n: usize) -> Self {
        self.number_of_initial_queries = Some(n);
        self
    }

    /// Sets the maximum concurrency.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Sets the retry budget for generation and finalization calls.
    #[must_use]
    pub const fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "gemini".to_string()),
            api_key,
            base_url: self.base_url,
            classifier_model: self
                .classifier_model
                .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string()),
            query_generator_model: self
                .query_generator_model
                .unwrap_or_else(|| DEFAULT_QUERY_GENERATOR_MODEL.to_string()),
            answer_model: self
                .answer_model
                .unwrap_or_else(|| DEFAULT_ANSWER_MODEL.to_string()),
            number_of_initial_queries: self
                .number_of_initial_queries
                .unwrap_or(DEFAULT_INITIAL_QUERIES),
            max_concurrency: self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        })
    }
}
