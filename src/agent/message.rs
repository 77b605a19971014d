//! Provider-agnostic message types for LLM communication.
//!
//! These types decouple pipeline logic from any specific LLM SDK. The
//! request carries the knobs this workflow actually uses (temperature,
//! JSON output, the provider's web-search tool, a retry budget); the
//! response carries text plus optional grounding metadata linking spans
//! of that text to web sources.

use serde::{Deserialize, Serialize};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Message content.
    pub content: String,
}

/// A chat completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier (e.g., "gemini-2.0-flash").
    pub model: String,
    /// The fully formatted prompt text.
    pub prompt: String,
    /// Sampling temperature (0.0 = deterministic-leaning).
    pub temperature: f32,
    /// Request JSON-formatted output.
    pub json_mode: bool,
    /// Enable the provider's hosted web-search tool.
    pub enable_search: bool,
    /// Additional attempts after the first on transport failure.
    pub max_retries: u32,
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Accumulates another usage record into this one, saturating.
    pub fn accumulate(&mut self, other: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

/// One retrieved web source referenced by grounding metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    /// Resolvable URL of the source.
    pub uri: String,
    /// Source title as reported by the search tool (usually the domain).
    pub title: String,
}

/// A span of generated text attributed to one or more sources.
///
/// Offsets are end-exclusive byte positions into the *original*,
/// pre-annotation response text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSupport {
    /// Start of the attributed span.
    pub start_index: usize,
    /// End of the attributed span (exclusive).
    pub end_index: usize,
    /// Indices into the chunk list for the sources backing this span.
    pub chunk_indices: Vec<usize>,
}

/// Source-attribution data returned by a search-enabled completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingMetadata {
    /// Retrieved sources.
    pub chunks: Vec<GroundingChunk>,
    /// Text spans attributed to those sources.
    pub supports: Vec<GroundingSupport>,
}

impl GroundingMetadata {
    /// Returns `true` when no sources were retrieved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// A chat completion response (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text content.
    pub content: String,
    /// Grounding metadata, present only on search-enabled calls that
    /// actually retrieved sources.
    pub grounding: Option<GroundingMetadata>,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Finish reason from the model (e.g., `"stop"`).
    pub finish_reason: Option<String>,
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content: content.to_string(),
    }
}

/// Creates an assistant message.
#[must_use]
pub fn assistant_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::Assistant,
        content: content.to_string(),
    }
}
