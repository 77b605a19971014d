//! Classification agent.
//!
//! Decides whether the user's question is in-domain (Vietnamese land,
//! vehicle-registration, or notarization law) via a single structured
//! LLM call. There is no retry wrapper: a transport or parse failure
//! here fails the whole run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::AgentConfig;
use super::provider::LlmProvider;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Structured verdict returned by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Whether the question is related to law, notarization, or
    /// authentication.
    pub is_legal_question: bool,
    /// Brief explanation for the classification.
    #[serde(default)]
    pub reason: String,
}

/// Agent that classifies the user's question.
pub struct ClassifierAgent {
    model: String,
}

impl ClassifierAgent {
    /// Creates a new classifier agent from configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.classifier_model.clone(),
        }
    }

    /// Executes the agent and parses the structured verdict.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ResponseParse`] if the response is not a
    /// valid `ClassificationResult`.
    pub async fn classify(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
    ) -> Result<(ClassificationResult, AgentResponse), AgentError> {
        let response = self.execute(provider, prompt).await?;
        let result = Self::parse_classification(&response.content)?;
        Ok((result, response))
    }

    /// Parses the agent's JSON response into a classification verdict.
    fn parse_classification(content: &str) -> Result<ClassificationResult, AgentError> {
        let trimmed = content.trim();

        // Handle markdown code blocks
        let json_str = if trimmed.starts_with("```") {
            trimmed
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim()
        } else {
            trimmed
        };

        serde_json::from_str::<ClassificationResult>(json_str).map_err(|e| {
            AgentError::ResponseParse {
                message: format!("Failed to parse classification: {e}"),
                content: content.to_string(),
            }
        })
    }
}

#[async_trait]
impl Agent for ClassifierAgent {
    fn name(&self) -> &'static str {
        "classifier"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn temperature(&self) -> f32 {
        0.0
    }
}
