//! LLM client abstraction and request/response types.
//!
//! This module defines the core abstractions for interacting with text
//! generation providers.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trendcast_core::AppError;

/// Text generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The prompt text to send to the model
    pub prompt: String,
}

impl LlmRequest {
    /// Create a new request for a rendered prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Text generation response. `content` is never blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Usage statistics
    #[serde(default)]
    pub usage: LlmUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LlmUsage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens used
    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Why a generation call produced no usable text.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never got a response (connection, DNS, TLS, body read)
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request exceeded its deadline
    #[error("request timed out")]
    Timeout,

    /// The provider answered with a non-success status
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A well-formed response that carries no candidate text
    #[error("no text in response (finish reason: {})", .finish_reason.as_deref().unwrap_or("unknown"))]
    Absent { finish_reason: Option<String> },

    /// Candidate text was present but empty or whitespace
    #[error("model returned blank output")]
    Blank,

    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Transport failures, timeouts, rate limiting and server errors may
    /// succeed on a later attempt; everything else will not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Transport(_) | LlmError::Timeout => true,
            LlmError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            LlmError::Absent { .. } | LlmError::Blank | LlmError::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Generation(err.to_string())
    }
}

/// Result of a single generation call.
pub type LlmResult<T> = Result<T, LlmError>;

/// Trait for text generation providers.
///
/// Implementations are bound to one model; callers only supply the prompt.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "gemini").
    fn provider_name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Perform a non-streaming completion.
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Timeout.is_transient());
        assert!(LlmError::Transport("reset".into()).is_transient());
        assert!(LlmError::Status { status: 429, body: String::new() }.is_transient());
        assert!(LlmError::Status { status: 503, body: String::new() }.is_transient());

        assert!(!LlmError::Status { status: 400, body: String::new() }.is_transient());
        assert!(!LlmError::Status { status: 403, body: String::new() }.is_transient());
        assert!(!LlmError::Blank.is_transient());
        assert!(!LlmError::Absent { finish_reason: None }.is_transient());
        assert!(!LlmError::Malformed("x".into()).is_transient());
    }

    #[test]
    fn test_converts_to_generation_error() {
        let err: AppError = LlmError::Absent {
            finish_reason: Some("SAFETY".to_string()),
        }
        .into();
        assert_eq!(err.kind(), "GenerationError");
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_usage_totals() {
        let usage = LlmUsage::new(10, 32);
        assert_eq!(usage.total_tokens, 42);
    }
}
