//! Error types for phaply-rs.
//!
//! Errors are split by layer: [`AgentError`] covers the research pipeline
//! (configuration, provider transport, response parsing, orchestration),
//! [`CommandError`] covers the CLI layer. All variants use `thiserror`.

use thiserror::Error;

/// Errors from the agent pipeline.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was found in configuration or environment.
    ///
    /// The key is required before any request is served; this error is
    /// raised at configuration build time, not at call time.
    #[error("API key missing: set GEMINI_API_KEY or pass --api-key")]
    ApiKeyMissing,

    /// Unknown provider name in configuration.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The provider name that failed to resolve.
        name: String,
    },

    /// Provider transport failure (HTTP error, timeout, malformed body).
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Human-readable failure description.
        message: String,
        /// HTTP status code, if the request reached the server.
        status: Option<u16>,
    },

    /// The model's response could not be parsed into the expected shape.
    #[error("failed to parse model response: {message}")]
    ResponseParse {
        /// What went wrong during parsing.
        message: String,
        /// The raw response content, kept for diagnostics.
        content: String,
    },

    /// Workflow-level failure (empty input, empty query batch, task join).
    #[error("orchestration failed: {message}")]
    Orchestration {
        /// Human-readable failure description.
        message: String,
    },
}

/// Errors from CLI command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not be executed.
    #[error("command failed: {0}")]
    ExecutionFailed(String),

    /// User-supplied input was invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem failure (prompt template scaffolding).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AgentError> for CommandError {
    fn from(err: AgentError) -> Self {
        Self::ExecutionFailed(err.to_string())
    }
}

/// Result alias for CLI command implementations.
pub type Result<T, E = CommandError> = std::result::Result<T, E>;
