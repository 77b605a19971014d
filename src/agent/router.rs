//! Routing and refusal for the classification branch.
//!
//! Pure functions only: no I/O. The two-way branch is a minimal tagged
//! union driven solely by the classifier's verdict.

use super::message::{ChatMessage, assistant_message};
use super::prompt::REFUSAL_MESSAGE;
use crate::core::Classification;

/// The next pipeline step after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// In-domain: continue to query generation.
    GenerateQuery,
    /// Out-of-domain: respond with the fixed refusal and terminate.
    HandleNonLegal,
}

/// Maps a classification to the next step.
///
/// Anything other than an affirmative [`Classification::Legal`] —
/// including the unset state — routes to the refusal path.
#[must_use]
pub const fn decide_next_step(classification: Classification) -> NextStep {
    if classification.is_legal() {
        NextStep::GenerateQuery
    } else {
        NextStep::HandleNonLegal
    }
}

/// Produces the fixed refusal message for out-of-domain questions.
///
/// Terminal step; no search or generation call occurs on this path.
#[must_use]
pub fn handle_non_legal_question() -> ChatMessage {
    assistant_message(REFUSAL_MESSAGE)
}
