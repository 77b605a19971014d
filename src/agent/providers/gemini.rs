//! Gemini provider implementation over the REST `generateContent` API.
//!
//! Talks to `generativelanguage.googleapis.com` (or a base URL override)
//! via `reqwest`. This is the only provider that can run the hosted
//! `google_search` tool and return grounding metadata, which the
//! research step depends on.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agent::config::AgentConfig;
use crate::agent::message::{
    ChatRequest, ChatResponse, GroundingChunk, GroundingMetadata, GroundingSupport, TokenUsage,
};
use crate::agent::provider::LlmProvider;
use crate::error::AgentError;

/// Default API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Base delay for retry backoff; doubles per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    generation_config: WireGenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
    usage_metadata: Option<WireUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    content: Option<WireContent>,
    finish_reason: Option<String>,
    grounding_metadata: Option<WireGroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireGroundingMetadata {
    grounding_chunks: Vec<WireGroundingChunk>,
    grounding_supports: Vec<WireGroundingSupport>,
}

#[derive(Debug, Deserialize)]
struct WireGroundingChunk {
    web: Option<WireWebSource>,
}

#[derive(Debug, Deserialize)]
struct WireWebSource {
    #[serde(default)]
    uri: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGroundingSupport {
    segment: Option<WireSegment>,
    #[serde(default)]
    grounding_chunk_indices: Vec<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSegment {
    // The API omits zero-valued fields (proto3 default elision).
    #[serde(default)]
    start_index: usize,
    end_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

// ==================== Provider ====================

/// Gemini LLM provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new provider from agent configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::ApiRequest {
                message: format!("Failed to build HTTP client: {e}"),
                status: None,
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// Builds the wire request from our generic request.
    fn build_request(request: &ChatRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![WireContent {
                role: "user".to_string(),
                parts: vec![WirePart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: WireGenerationConfig {
                temperature: request.temperature,
                response_mime_type: request
                    .json_mode
                    .then(|| "application/json".to_string()),
            },
            tools: request.enable_search.then(|| {
                vec![WireTool {
                    google_search: serde_json::Map::new(),
                }]
            }),
        }
    }

    /// Converts the wire response into our generic response.
    fn convert_response(response: GenerateContentResponse) -> ChatResponse {
        let usage = response
            .usage_metadata
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            });

        let Some(candidate) = response.candidates.into_iter().next() else {
            return ChatResponse {
                content: String::new(),
                grounding: None,
                usage,
                finish_reason: None,
            };
        };

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let grounding = candidate.grounding_metadata.map(Self::convert_grounding);

        ChatResponse {
            content,
            grounding,
            usage,
            finish_reason: candidate.finish_reason,
        }
    }

    /// Converts wire grounding metadata, preserving chunk index alignment.
    ///
    /// Chunks without a web source keep their position (with an empty
    /// URI) so support indices stay valid; supports without an end
    /// offset are dropped.
    fn convert_grounding(wire: WireGroundingMetadata) -> GroundingMetadata {
        let chunks = wire
            .grounding_chunks
            .into_iter()
            .map(|c| {
                c.web.map_or_else(
                    || GroundingChunk {
                        uri: String::new(),
                        title: String::new(),
                    },
                    |w| GroundingChunk {
                        uri: w.uri,
                        title: w.title,
                    },
                )
            })
            .collect();

        let supports = wire
            .grounding_supports
            .into_iter()
            .filter_map(|s| {
                let segment = s.segment?;
                let end_index = segment.end_index?;
                Some(GroundingSupport {
                    start_index: segment.start_index,
                    end_index,
                    chunk_indices: s.grounding_chunk_indices,
                })
            })
            .collect();

        GroundingMetadata { chunks, supports }
    }

    /// Whether an error is worth retrying at the transport layer.
    const fn is_retryable(error: &AgentError) -> bool {
        match error {
            AgentError::ApiRequest { status, .. } => match status {
                // Network-level failure with no response
                None => true,
                Some(code) => *code == 429 || *code >= 500,
            },
            _ => false,
        }
    }

    /// Issues one request attempt.
    async fn try_chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );
        let body = Self::build_request(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ApiRequest {
                message: e.to_string(),
                status: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AgentError::ApiRequest {
                message: format!("HTTP {status}: {message}"),
                status: Some(status.as_u16()),
            });
        }

        let wire: GenerateContentResponse =
            response.json().await.map_err(|e| AgentError::ApiRequest {
                message: format!("Invalid response body: {e}"),
                status: Some(status.as_u16()),
            })?;

        Ok(Self::convert_response(wire))
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let mut attempt: u32 = 0;
        loop {
            match self.try_chat(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < request.max_retries && Self::is_retryable(&e) => {
                    attempt += 1;
                    let delay = RETRY_BASE_DELAY * 2_u32.saturating_pow(attempt - 1);
                    warn!(
                        attempt,
                        max_retries = request.max_retries,
                        error = %e,
                        "retrying Gemini request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_request(json_mode: bool, enable_search: bool) -> ChatRequest {
        ChatRequest {
            model: "gemini-2.0-flash".to_string(),
            prompt: "xin chào".to_string(),
            temperature: 0.0,
            json_mode,
            enable_search,
            max_retries: 0,
        }
    }

    #[test]
    fn test_build_request_plain() {
        let built = GeminiProvider::build_request(&chat_request(false, false));
        let json = serde_json::to_value(&built).unwrap_or_default();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "xin chào");
        assert!(json["generationConfig"].get("responseMimeType").is_none());
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_build_request_json_mode() {
        let built = GeminiProvider::build_request(&chat_request(true, false));
        let json = serde_json::to_value(&built).unwrap_or_default();
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_build_request_search_tool() {
        let built = GeminiProvider::build_request(&chat_request(false, true));
        let json = serde_json::to_value(&built).unwrap_or_default();
        assert!(json["tools"][0].get("googleSearch").is_some());
    }

    #[test]
    fn test_convert_response_with_grounding() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Phí là 2%."}]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://luatvietnam.vn/a", "title": "luatvietnam.vn"}}
                    ],
                    "groundingSupports": [
                        {"segment": {"endIndex": 12}, "groundingChunkIndices": [0]}
                    ]
                }
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4, "totalTokenCount": 14}
        }"#;
        let wire: GenerateContentResponse =
            serde_json::from_str(body).unwrap_or_else(|_| unreachable!());
        let response = GeminiProvider::convert_response(wire);

        assert_eq!(response.content, "Phí là 2%.");
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.usage.total_tokens, 14);

        let grounding = response.grounding.unwrap_or_default();
        assert_eq!(grounding.chunks.len(), 1);
        assert_eq!(grounding.supports.len(), 1);
        // startIndex omitted by the API means zero
        assert_eq!(grounding.supports[0].start_index, 0);
        assert_eq!(grounding.supports[0].end_index, 12);
    }

    #[test]
    fn test_convert_response_no_candidates() {
        let wire: GenerateContentResponse =
            serde_json::from_str("{}").unwrap_or_else(|_| unreachable!());
        let response = GeminiProvider::convert_response(wire);
        assert!(response.content.is_empty());
        assert!(response.grounding.is_none());
    }

    #[test]
    fn test_convert_grounding_keeps_chunk_alignment() {
        let body = r#"{
            "groundingChunks": [
                {},
                {"web": {"uri": "https://chinhphu.vn/b", "title": "chinhphu.vn"}}
            ],
            "groundingSupports": [
                {"segment": {"startIndex": 3, "endIndex": 9}, "groundingChunkIndices": [1]},
                {"groundingChunkIndices": [0]}
            ]
        }"#;
        let wire: WireGroundingMetadata =
            serde_json::from_str(body).unwrap_or_else(|_| unreachable!());
        let grounding = GeminiProvider::convert_grounding(wire);

        // Placeholder chunk keeps index 1 pointing at chinhphu.vn
        assert_eq!(grounding.chunks.len(), 2);
        assert!(grounding.chunks[0].uri.is_empty());
        assert_eq!(grounding.chunks[1].uri, "https://chinhphu.vn/b");
        // Support without a segment is dropped
        assert_eq!(grounding.supports.len(), 1);
        assert_eq!(grounding.supports[0].start_index, 3);
    }

    #[test]
    fn test_is_retryable() {
        let network = AgentError::ApiRequest {
            message: "timeout".to_string(),
            status: None,
        };
        let throttled = AgentError::ApiRequest {
            message: "429".to_string(),
            status: Some(429),
        };
        let server = AgentError::ApiRequest {
            message: "500".to_string(),
            status: Some(500),
        };
        let client_err = AgentError::ApiRequest {
            message: "400".to_string(),
            status: Some(400),
        };
        let parse = AgentError::ResponseParse {
            message: "bad".to_string(),
            content: String::new(),
        };
        assert!(GeminiProvider::is_retryable(&network));
        assert!(GeminiProvider::is_retryable(&throttled));
        assert!(GeminiProvider::is_retryable(&server));
        assert!(!GeminiProvider::is_retryable(&client_err));
        assert!(!GeminiProvider::is_retryable(&parse));
    }
}
