//! Legal research workflow for phaply-rs.
//!
//! Answers Vietnamese land, vehicle-registration, and notarization law
//! questions by classifying the question, generating web-search queries,
//! fanning out search-grounded LLM calls, and synthesizing a cited
//! answer. Uses a pluggable provider abstraction backed by the Gemini
//! REST API.
//!
//! # Architecture
//!
//! ```text
//! Conversation → Orchestrator
//!   ├── ClassifierAgent (in-domain?)
//!   ├── Router → refusal (terminal) | research path
//!   ├── QueryWriterAgent → N search queries
//!   ├── Fan-out → N concurrent WebResearchAgents
//!   │   └── Each returns citation-annotated text + sources
//!   ├── Join + merge branch deltas
//!   └── FinalizerAgent → cited answer, short URLs restored
//! ```

pub mod citations;
pub mod classifier;
pub mod client;
pub mod config;
pub mod finalizer;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod query_writer;
pub mod researcher;
pub mod router;
pub mod state;
pub mod traits;

// Re-export key types
pub use classifier::{ClassificationResult, ClassifierAgent};
pub use config::AgentConfig;
pub use finalizer::FinalizerAgent;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{Orchestrator, RunOverrides, dispatch_research};
pub use prompt::{PromptSet, REFUSAL_MESSAGE};
pub use provider::LlmProvider;
pub use query_writer::QueryWriterAgent;
pub use researcher::WebResearchAgent;
pub use router::{NextStep, decide_next_step, handle_non_legal_question};
pub use state::{
    OverallState, ResearchDelta, RunResult, SearchQueryBatch, SourceRecord, WebSearchUnit,
};
pub use traits::Agent;
