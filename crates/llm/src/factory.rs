//! LLM provider factory.
//!
//! Builds the generation client the service uses from configuration: resolves
//! the provider, checks the credential and wraps the client in the retry
//! decorator.

use crate::client::LlmClient;
use crate::providers::GeminiClient;
use crate::retry::RetryingClient;
use std::sync::Arc;
use std::time::Duration;
use trendcast_core::config::{ApiKey, LlmSettings, API_KEY_ENV};
use trendcast_core::{AppError, AppResult};

/// Create a generation client from settings.
///
/// # Errors
/// Returns `AppError::Config` if:
/// - Provider is unknown
/// - The API key is missing or blank
/// - Client initialization fails
pub fn create_client(
    settings: &LlmSettings,
    api_key: Option<&ApiKey>,
) -> AppResult<Arc<dyn LlmClient>> {
    match settings.provider.to_lowercase().as_str() {
        "gemini" => {
            let api_key = api_key
                .filter(|key| !key.expose().trim().is_empty())
                .ok_or_else(|| {
                    AppError::Config(format!("Gemini provider requires {}", API_KEY_ENV))
                })?;

            let client = GeminiClient::with_endpoint(
                settings.endpoint.as_str(),
                settings.model.as_str(),
                api_key.clone(),
                Duration::from_secs(settings.timeout_secs),
            )
            .map_err(|e| AppError::Config(format!("Failed to create Gemini client: {}", e)))?;

            tracing::debug!(model = %settings.model, max_retries = settings.max_retries, "Created Gemini client");
            Ok(Arc::new(RetryingClient::new(client, settings.max_retries)))
        }
        _ => Err(AppError::Config(format!(
            "Unknown provider: {}",
            settings.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gemini_client() {
        let key = ApiKey::new("test-key");
        let client = create_client(&LlmSettings::default(), Some(&key)).unwrap();
        assert_eq!(client.provider_name(), "gemini");
        assert_eq!(client.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_gemini_requires_api_key() {
        match create_client(&LlmSettings::default(), None) {
            Err(AppError::Config(msg)) => assert!(msg.contains(API_KEY_ENV)),
            Err(other) => panic!("Expected config error, got {other}"),
            Ok(_) => panic!("Expected error for Gemini without API key"),
        }

        let blank = ApiKey::new("   ");
        assert!(create_client(&LlmSettings::default(), Some(&blank)).is_err());
    }

    #[test]
    fn test_unknown_provider() {
        let settings = LlmSettings {
            provider: "unknown".to_string(),
            ..LlmSettings::default()
        };
        match create_client(&settings, Some(&ApiKey::new("k"))) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
