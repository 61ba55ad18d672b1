//! Embedding provider trait and factory.

use super::providers::{GeminiEmbeddingProvider, HashedProvider, OllamaProvider};
use std::sync::Arc;
use trendcast_core::config::{ApiKey, EmbeddingSettings, KNOWN_EMBEDDING_PROVIDERS};
use trendcast_core::{AppError, AppResult};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "gemini", "ollama", "hashed")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts, one vector per text, in order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::EmbeddingUnavailable("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from settings.
///
/// Unknown provider names are a `Config` error; a provider that cannot be
/// constructed or reached is `EmbeddingUnavailable`.
pub async fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&ApiKey>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::EmbeddingUnavailable(
                    "Gemini embeddings require GEMINI_API_KEY".to_string(),
                )
            })?;
            let provider = GeminiEmbeddingProvider::new(settings, api_key.clone())?;
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider = OllamaProvider::new(settings).await?;
            Ok(Arc::new(provider))
        }

        "hashed" => Ok(Arc::new(HashedProvider::new(settings.dimensions))),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: {}",
            settings.provider,
            KNOWN_EMBEDDING_PROVIDERS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashed_settings() -> EmbeddingSettings {
        EmbeddingSettings {
            provider: "hashed".to_string(),
            model: "hashed-v1".to_string(),
            dimensions: 256,
            ..EmbeddingSettings::default()
        }
    }

    #[tokio::test]
    async fn test_create_hashed_provider() {
        let provider = create_provider(&hashed_settings(), None).await.unwrap();
        assert_eq!(provider.provider_name(), "hashed");
        assert_eq!(provider.dimensions(), 256);
    }

    #[tokio::test]
    async fn test_create_unknown_provider() {
        let settings = EmbeddingSettings {
            provider: "unknown".to_string(),
            ..hashed_settings()
        };

        let result = create_provider(&settings, None).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_gemini_without_key_is_unavailable() {
        let result = create_provider(&EmbeddingSettings::default(), None).await;
        assert!(matches!(result, Err(AppError::EmbeddingUnavailable(_))));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&hashed_settings(), None).await.unwrap();

        let embedding = provider.embed("cricket final").await.unwrap();
        assert_eq!(embedding.len(), 256);
    }
}
