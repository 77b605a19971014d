//! phaply-rs: Vietnamese legal research agent.
//!
//! Classifies a user's question against a narrow legal domain (land,
//! vehicle registration, notarization), generates web-search queries,
//! runs search-grounded LLM calls in parallel, and synthesizes a final
//! answer with restored source citations. Out-of-domain questions get a
//! fixed polite refusal.
//!
//! The workflow is an in-process call graph: embed it via
//! [`agent::Orchestrator`], or use the thin CLI in [`cli`]. Nothing is
//! persisted across runs.

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;

pub use agent::{AgentConfig, Orchestrator, RunOverrides};
pub use crate::core::Classification;
pub use error::{AgentError, CommandError};
