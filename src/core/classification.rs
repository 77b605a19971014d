//! Classification state for user questions.
//!
//! This type lives in `core` (outside the `agent` module) so that the
//! CLI output layer can report it without depending on pipeline
//! internals.

use serde::{Deserialize, Serialize};

/// Tri-state classification of a user question.
///
/// Every run starts [`Unclassified`](Classification::Unclassified); the
/// classifier moves it to [`Legal`](Classification::Legal) or
/// [`NonLegal`](Classification::NonLegal). Routing treats anything other
/// than `Legal` as out-of-domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// The classifier has not run yet.
    #[default]
    Unclassified,
    /// In-domain: land, vehicle registration, or notarization law.
    Legal,
    /// Out-of-domain: answered with the fixed refusal.
    NonLegal,
}

impl Classification {
    /// Builds a classification from the classifier's boolean verdict.
    #[must_use]
    pub const fn from_verdict(is_legal: bool) -> Self {
        if is_legal { Self::Legal } else { Self::NonLegal }
    }

    /// Returns `true` only for an affirmative in-domain classification.
    #[must_use]
    pub const fn is_legal(self) -> bool {
        matches!(self, Self::Legal)
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unclassified => "unclassified",
            Self::Legal => "legal",
            Self::NonLegal => "non_legal",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
