//! Shared service state and the request-level operations behind each route.

use crate::hashtags::extract_hashtags;
use std::sync::Arc;
use tokio::sync::Mutex;
use trendcast_core::{AppConfig, AppError, AppResult, Table, TabularStore, TrendRecord};
use trendcast_llm::{create_client, LlmClient, LlmRequest};
use trendcast_prompt::{style_instruction, BuiltPrompt, PromptLibrary};
use trendcast_retrieval::{create_provider, EmbeddingProvider, IndexHandle};

/// Topic used when a generation request carries no usable prompt.
pub const DEFAULT_TOPIC: &str = "an engaging and trending topic";

/// Prompts shorter than this (after trimming) fall back to [`DEFAULT_TOPIC`].
const MIN_TOPIC_CHARS: usize = 3;

/// Everything a request handler needs, shared behind an `Arc`.
pub struct ServiceState {
    store: TabularStore,
    index: IndexHandle,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    llm: Arc<dyn LlmClient>,
    prompts: PromptLibrary,
    top_k: usize,
    reload_lock: Mutex<()>,
}

impl std::fmt::Debug for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceState")
            .field("store", &self.store)
            .field("trends_count", &self.index.len())
            .field("embedder", &self.embedder.as_ref().map(|e| e.provider_name()))
            .field("model", &self.llm.model())
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl ServiceState {
    pub fn new(
        store: TabularStore,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
        llm: Arc<dyn LlmClient>,
        prompts: PromptLibrary,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            index: IndexHandle::new(),
            embedder,
            llm,
            prompts,
            top_k,
            reload_lock: Mutex::new(()),
        }
    }

    /// Build the state from configuration.
    ///
    /// Generation and prompt problems are fatal. An embedding provider that
    /// cannot be constructed only disables retrieval.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let llm = create_client(&config.llm, config.api_key.as_ref())?;
        let prompts = PromptLibrary::load(config.prompts_dir.as_deref())?;

        let embedder = match create_provider(&config.embedding, config.api_key.as_ref()).await {
            Ok(provider) => Some(provider),
            Err(e @ AppError::Config(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Embedding provider unavailable; retrieval disabled");
                None
            }
        };

        Ok(Self::new(
            TabularStore::new(config.data_dir.clone()),
            embedder,
            llm,
            prompts,
            config.server.top_k,
        ))
    }

    /// Attempt the initial index build. Failure leaves the service running
    /// without retrieval.
    pub async fn initialize(self) -> Self {
        match self.reload().await {
            Ok(count) => tracing::info!(trends = count, "Relevance index ready"),
            Err(e) => tracing::warn!(
                kind = e.kind(),
                error = %e,
                "Initial index build failed; answering without trend context"
            ),
        }
        self
    }

    pub fn store(&self) -> &TabularStore {
        &self.store
    }

    pub fn index(&self) -> &IndexHandle {
        &self.index
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Rebuild the index from the Twitter trends table and swap it in.
    ///
    /// Concurrent reloads run one at a time. On failure the previous index
    /// stays in place.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn reload(&self) -> AppResult<usize> {
        let _guard = self.reload_lock.lock().await;

        let embedder = self.embedder.clone().ok_or_else(|| {
            AppError::EmbeddingUnavailable("No embedding provider is configured".to_string())
        })?;
        let records: Vec<TrendRecord> = self.store.read(Table::TwitterTrends).await?;

        let count = self.index.rebuild(records, embedder).await?;
        tracing::info!(trends = count, "Swapped in rebuilt index");
        Ok(count)
    }

    /// Trends most relevant to `query`. Empty when there is no index or the
    /// query cannot be embedded.
    pub async fn retrieve(&self, query: &str) -> Vec<TrendRecord> {
        let Some(snapshot) = self.index.snapshot() else {
            tracing::debug!("No index; skipping retrieval");
            return Vec::new();
        };

        match snapshot.query(query, self.top_k).await {
            Ok(scored) => {
                tracing::debug!(hits = scored.len(), "Retrieved trends");
                scored.into_iter().map(|s| s.record).collect()
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "Retrieval failed; continuing without context");
                Vec::new()
            }
        }
    }

    /// Up to five hashtags for `prompt`.
    pub async fn hashtags(&self, prompt: Option<&str>) -> AppResult<Vec<String>> {
        let topic = topic_or_default(prompt);
        let built = self.prompts.hashtags(topic)?;
        let output = self.generate(&built).await?;
        Ok(extract_hashtags(&output))
    }

    /// A short content script for `prompt`.
    pub async fn content(&self, prompt: Option<&str>) -> AppResult<String> {
        let topic = topic_or_default(prompt);
        let built = self.prompts.content(topic)?;
        self.generate(&built).await
    }

    /// Answer a free-form question, or apply a style rewrite when `prompt`
    /// is one of the fixed style keys.
    pub async fn ask(&self, prompt: &str, content: &str) -> AppResult<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AppError::Validation("prompt is required".to_string()));
        }

        let built = match style_instruction(prompt) {
            Some(instruction) => {
                tracing::debug!(style = prompt, "Applying style rewrite");
                self.prompts.rewrite(instruction, content)?
            }
            None => {
                let trends = self.retrieve(prompt).await;
                self.prompts.answer(prompt, content, &trends)?
            }
        };

        self.generate(&built).await
    }

    async fn generate(&self, built: &BuiltPrompt) -> AppResult<String> {
        tracing::debug!(
            prompt_id = %built.metadata.source_prompt_id,
            trends = built.metadata.trends_included,
            "Generating"
        );
        let response = self.llm.complete(&LlmRequest::new(built.text.as_str())).await?;
        Ok(response.content)
    }
}

fn topic_or_default(prompt: Option<&str>) -> &str {
    match prompt.map(str::trim) {
        Some(topic) if topic.chars().count() >= MIN_TOPIC_CHARS => topic,
        _ => DEFAULT_TOPIC,
    }
}
