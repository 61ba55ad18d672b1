//! Gemini text generation provider.
//!
//! Talks to the `generateContent` REST endpoint:
//! https://ai.google.dev/api/generate-content

use crate::client::{LlmClient, LlmError, LlmRequest, LlmResponse, LlmResult, LlmUsage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trendcast_core::config::ApiKey;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Gemini API response format. Every field is optional so that a
/// structurally odd but valid JSON body is classified rather than rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// What a response body yielded, before deciding whether it is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateText {
    /// Concatenated text parts of the first candidate
    Text(String),
    /// A valid body with no candidate text, e.g. a safety block
    Absent { finish_reason: Option<String> },
    /// The body was not a generateContent response
    Malformed(String),
}

impl CandidateText {
    fn from_response(response: &GenerateContentResponse) -> Self {
        let Some(candidate) = response.candidates.first() else {
            let finish_reason = response
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.clone());
            return CandidateText::Absent { finish_reason };
        };

        let texts: Vec<&str> = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect();

        if texts.is_empty() {
            CandidateText::Absent {
                finish_reason: candidate.finish_reason.clone(),
            }
        } else {
            CandidateText::Text(texts.concat())
        }
    }

    /// Only non-blank text is a usable answer. Usable text is returned as
    /// the model produced it.
    pub fn into_text(self) -> LlmResult<String> {
        match self {
            CandidateText::Text(text) if text.trim().is_empty() => Err(LlmError::Blank),
            CandidateText::Text(text) => Ok(text),
            CandidateText::Absent { finish_reason } => Err(LlmError::Absent { finish_reason }),
            CandidateText::Malformed(reason) => Err(LlmError::Malformed(reason)),
        }
    }
}

/// A decoded response body: the candidate text plus whatever metadata the
/// body carried.
#[derive(Debug)]
struct DecodedReply {
    text: CandidateText,
    usage: LlmUsage,
    model_version: Option<String>,
}

impl DecodedReply {
    fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<GenerateContentResponse>(body) {
            Ok(response) => Self {
                text: CandidateText::from_response(&response),
                usage: response
                    .usage_metadata
                    .map(|u| LlmUsage::new(u.prompt_token_count, u.candidates_token_count))
                    .unwrap_or_default(),
                model_version: response.model_version,
            },
            Err(e) => Self {
                text: CandidateText::Malformed(e.to_string()),
                usage: LlmUsage::default(),
                model_version: None,
            },
        }
    }
}

/// Gemini generation client.
pub struct GeminiClient {
    /// Base URL for the Gemini API
    endpoint: String,

    model: String,

    api_key: ApiKey,

    /// HTTP client with the request timeout applied
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client for `model` against the public endpoint.
    pub fn new(model: impl Into<String>, api_key: ApiKey, timeout: Duration) -> LlmResult<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, model, api_key, timeout)
    }

    /// Create a client with a custom base URL.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: ApiKey,
        timeout: Duration,
    ) -> LlmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    fn to_gemini_request<'a>(&self, request: &'a LlmRequest) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
        }
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        tracing::debug!(model = %self.model, prompt_chars = request.prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&self.to_gemini_request(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).chars().take(500).collect(),
            });
        }

        let reply = DecodedReply::from_body(&body);
        let content = reply.text.into_text()?;
        let usage = reply.usage;

        tracing::debug!(
            model = %self.model,
            completion_tokens = usage.completion_tokens,
            "Received completion from Gemini"
        );

        Ok(LlmResponse {
            content,
            model: reply.model_version.unwrap_or_else(|| self.model.clone()),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_candidate() {
        let body = br##"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "#one "}, {"text": "#two"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4},
            "modelVersion": "gemini-2.5-flash-001"
        }"##;

        let reply = DecodedReply::from_body(body);
        assert_eq!(reply.usage, LlmUsage::new(12, 4));
        assert_eq!(reply.model_version.as_deref(), Some("gemini-2.5-flash-001"));
        assert_eq!(reply.text, CandidateText::Text("#one #two".to_string()));
        assert_eq!(reply.text.into_text().unwrap(), "#one #two");
    }

    #[test]
    fn test_text_is_returned_verbatim() {
        let text = CandidateText::Text("  line one\n\n".to_string());
        assert_eq!(text.into_text().unwrap(), "  line one\n\n");
    }

    #[test]
    fn test_blocked_prompt_is_absent() {
        let body = br#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert_eq!(
            DecodedReply::from_body(body).text,
            CandidateText::Absent {
                finish_reason: Some("SAFETY".to_string())
            }
        );
    }

    #[test]
    fn test_candidate_without_parts_is_absent() {
        let body = br#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#;
        let err = DecodedReply::from_body(body).text.into_text().unwrap_err();
        assert!(matches!(err, LlmError::Absent { finish_reason: Some(ref r) } if r == "MAX_TOKENS"));
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let body = br#"{"candidates": [{"content": {"parts": [{"text": "  \n "}]}}]}"#;
        assert!(matches!(
            DecodedReply::from_body(body).text.into_text(),
            Err(LlmError::Blank)
        ));
    }

    #[test]
    fn test_unexpected_shape_is_malformed() {
        assert!(matches!(
            DecodedReply::from_body(b"not json").text,
            CandidateText::Malformed(_)
        ));
        assert!(matches!(
            DecodedReply::from_body(br#"{"candidates": "nope"}"#).text,
            CandidateText::Malformed(_)
        ));
    }

    #[test]
    fn test_request_shape() {
        let client = GeminiClient::new(
            "gemini-2.5-flash",
            ApiKey::new("k"),
            Duration::from_secs(5),
        )
        .unwrap();
        let request = LlmRequest::new("hello");
        let json = serde_json::to_value(client.to_gemini_request(&request)).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert!(json.get("generationConfig").is_none());
        assert_eq!(
            client.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let client =
            GeminiClient::new("m", ApiKey::new("secret-key"), Duration::from_secs(5)).unwrap();
        assert!(!format!("{:?}", client).contains("secret-key"));
    }
}
