//! Gemini embedding provider.
//!
//! Uses the `batchEmbedContents` endpoint, chunked to the configured batch
//! size: https://ai.google.dev/api/embeddings

use crate::embeddings::EmbeddingProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use trendcast_core::config::{ApiKey, EmbeddingSettings};
use trendcast_core::{AppError, AppResult};

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// The API accepts at most this many requests per batch call.
const MAX_BATCH: usize = 100;

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Gemini embedding provider.
pub struct GeminiEmbeddingProvider {
    client: Client,
    base_url: String,
    /// Model name, e.g. "text-embedding-004"
    model: String,
    /// "models/<model>", as the request body expects
    model_path: String,
    dimensions: usize,
    batch_size: usize,
    api_key: ApiKey,
}

impl std::fmt::Debug for GeminiEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiEmbeddingProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl GeminiEmbeddingProvider {
    pub fn new(settings: &EmbeddingSettings, api_key: ApiKey) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::EmbeddingUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        let base_url = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            model: settings.model.clone(),
            model_path: format!("models/{}", settings.model),
            dimensions: settings.dimensions,
            batch_size: settings.batch_size.clamp(1, MAX_BATCH),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/{}:batchEmbedContents",
            self.base_url, self.model_path
        )
    }

    fn request_body<'a>(&'a self, texts: &'a [String]) -> BatchEmbedRequest<'a> {
        BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: &self.model_path,
                    content: Content {
                        parts: [Part { text }],
                    },
                })
                .collect(),
        }
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_chunk(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&self.request_body(texts))
            .send()
            .await
            .map_err(|e| {
                AppError::EmbeddingUnavailable(format!("Failed to reach Gemini: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::EmbeddingUnavailable(format!(
                "Gemini embedding API error ({}): {}",
                status, error_text
            )));
        }

        let body: BatchEmbedResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingUnavailable(format!("Failed to parse Gemini response: {}", e))
        })?;

        check_vectors(&body.embeddings, texts.len(), self.dimensions)?;
        Ok(body.embeddings.into_iter().map(|e| e.values).collect())
    }
}

fn check_vectors(
    embeddings: &[ContentEmbedding],
    expected_count: usize,
    dimensions: usize,
) -> AppResult<()> {
    if embeddings.len() != expected_count {
        return Err(AppError::EmbeddingUnavailable(format!(
            "Gemini returned {} embeddings for {} texts",
            embeddings.len(),
            expected_count
        )));
    }
    if let Some(bad) = embeddings.iter().find(|e| e.values.len() != dimensions) {
        return Err(AppError::EmbeddingUnavailable(format!(
            "Unexpected embedding dimensions: got {}, expected {}",
            bad.values.len(),
            dimensions
        )));
    }
    Ok(())
}

#[async_trait::async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_chunk(chunk).await?);
        }

        debug!(count = embeddings.len(), "Generated Gemini embeddings");
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(batch_size: usize) -> GeminiEmbeddingProvider {
        let settings = EmbeddingSettings {
            batch_size,
            ..EmbeddingSettings::default()
        };
        GeminiEmbeddingProvider::new(&settings, ApiKey::new("test-key")).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let provider = provider(100);
        let texts = vec!["Twitter Trend: #IPL | Tweet Count: 1000".to_string()];
        let json = serde_json::to_value(provider.request_body(&texts)).unwrap();

        assert_eq!(json["requests"][0]["model"], "models/text-embedding-004");
        assert_eq!(
            json["requests"][0]["content"]["parts"][0]["text"],
            "Twitter Trend: #IPL | Tweet Count: 1000"
        );
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:batchEmbedContents"
        );
    }

    #[test]
    fn test_batch_size_is_clamped() {
        assert_eq!(provider(0).batch_size, 1);
        assert_eq!(provider(5000).batch_size, MAX_BATCH);
    }

    #[test]
    fn test_response_validation() {
        let body: BatchEmbedResponse =
            serde_json::from_str(r#"{"embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3]}]}"#)
                .unwrap();

        assert!(matches!(
            check_vectors(&body.embeddings, 3, 2),
            Err(AppError::EmbeddingUnavailable(_))
        ));
        assert!(matches!(
            check_vectors(&body.embeddings, 2, 2),
            Err(AppError::EmbeddingUnavailable(_))
        ));
        assert!(check_vectors(&body.embeddings[..1], 1, 2).is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        assert!(!format!("{:?}", provider(10)).contains("test-key"));
    }
}
