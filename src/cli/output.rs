//! Output formatting for CLI results.

use std::fmt::Write;

use crate::agent::state::RunResult;
use crate::error::{CommandError, Result};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format string (case-insensitive); unknown values fall
    /// back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a workflow result for display.
///
/// # Errors
///
/// Returns [`CommandError`] if JSON serialization fails.
pub fn format_run_result(result: &RunResult, format: OutputFormat, verbose: bool) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)
            .map_err(|e| CommandError::ExecutionFailed(format!("JSON serialization failed: {e}"))),
        OutputFormat::Text => {
            let mut output = result.answer.clone();

            if !result.sources.is_empty() {
                output.push_str("\n\nNguồn tham khảo:\n");
                for source in &result.sources {
                    let _ = writeln!(output, "- {}: {}", source.label, source.value);
                }
            }

            if verbose {
                let _ = write!(
                    output,
                    "\n---\nClassification: {} | Queries: {} | Sources: {} | Tokens: {} | Time: {:.1}s",
                    result.classification,
                    result.search_queries.len(),
                    result.sources.len(),
                    result.usage.total_tokens,
                    result.elapsed.as_secs_f64()
                );
            }

            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::agent::message::TokenUsage;
    use crate::agent::state::{SourceRecord, Span};
    use crate::core::Classification;

    fn sample_result() -> RunResult {
        RunResult {
            answer: "**TÓM TẮT:** phí 2%.".to_string(),
            classification: Classification::Legal,
            search_queries: vec!["lệ phí trước bạ".to_string()],
            sources: vec![SourceRecord {
                label: "luatvietnam".to_string(),
                short_url: "https://vertexaisearch.cloud.google.com/id/0-0".to_string(),
                value: "https://luatvietnam.vn/a".to_string(),
                segments: vec![Span { start: 0, end: 5 }],
            }],
            usage: TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            },
            elapsed: Duration::from_secs(3),
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("bogus"), OutputFormat::Text);
    }

    #[test]
    fn test_format_text() {
        let out = format_run_result(&sample_result(), OutputFormat::Text, false)
            .unwrap_or_else(|_| unreachable!());
        assert!(out.starts_with("**TÓM TẮT:**"));
        assert!(out.contains("Nguồn tham khảo:"));
        assert!(out.contains("- luatvietnam: https://luatvietnam.vn/a"));
        assert!(!out.contains("Tokens:"));
    }

    #[test]
    fn test_format_text_verbose() {
        let out = format_run_result(&sample_result(), OutputFormat::Text, true)
            .unwrap_or_else(|_| unreachable!());
        assert!(out.contains("Classification: legal"));
        assert!(out.contains("Tokens: 150"));
    }

    #[test]
    fn test_format_json() {
        let out = format_run_result(&sample_result(), OutputFormat::Json, false)
            .unwrap_or_else(|_| unreachable!());
        let parsed: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|_| unreachable!());
        assert_eq!(parsed["classification"], "legal");
        assert_eq!(parsed["sources"][0]["label"], "luatvietnam");
    }

    #[test]
    fn test_format_text_no_sources() {
        let mut result = sample_result();
        result.sources.clear();
        let out = format_run_result(&result, OutputFormat::Text, false)
            .unwrap_or_else(|_| unreachable!());
        assert!(!out.contains("Nguồn tham khảo"));
    }
}
