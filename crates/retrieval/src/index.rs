//! In-memory relevance index over trend records.
//!
//! Built once from a record sequence; immutable afterwards. Rebuilding means
//! constructing a new index and swapping it in through [`crate::IndexHandle`].

use crate::embeddings::EmbeddingProvider;
use serde::Serialize;
use std::sync::Arc;
use trendcast_core::{AppError, AppResult, TrendRecord};

/// A record with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTrend {
    pub record: TrendRecord,
    pub score: f32,
}

/// Ordered `(record, embedding)` pairs plus the provider that embedded them.
///
/// Queries are embedded with the same provider, so query and entry vectors
/// always come from one model.
#[derive(Debug)]
pub struct RelevanceIndex {
    entries: Vec<(TrendRecord, Vec<f32>)>,
    provider: Arc<dyn EmbeddingProvider>,
}

/// Text embedded for a record.
pub fn canonical_text(record: &TrendRecord) -> String {
    format!(
        "Twitter Trend: {} | Tweet Count: {}",
        record.text, record.count
    )
}

impl RelevanceIndex {
    /// Embed every record. Zero records give an empty index without calling
    /// the provider.
    #[tracing::instrument(skip_all, fields(records = records.len(), provider = provider.provider_name()))]
    pub async fn build(
        records: Vec<TrendRecord>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        if records.is_empty() {
            return Ok(Self {
                entries: Vec::new(),
                provider,
            });
        }

        let texts: Vec<String> = records.iter().map(canonical_text).collect();
        let embeddings = provider
            .embed_batch(&texts)
            .await
            .map_err(into_unavailable)?;

        if embeddings.len() != records.len() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "Provider returned {} embeddings for {} records",
                embeddings.len(),
                records.len()
            )));
        }

        let dimensions = embeddings[0].len();
        if embeddings.iter().any(|v| v.len() != dimensions) {
            return Err(AppError::EmbeddingUnavailable(
                "Provider returned embeddings of inconsistent dimension".to_string(),
            ));
        }

        tracing::debug!(dimensions, "Built relevance index");
        Ok(Self {
            entries: records.into_iter().zip(embeddings).collect(),
            provider,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &TrendRecord> {
        self.entries.iter().map(|(record, _)| record)
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Top `top_k` records most similar to `query`, best first.
    ///
    /// An empty index answers with no results for any `top_k`, without
    /// embedding the query. Otherwise `top_k == 0` is a `Validation` error.
    pub async fn query(&self, query: &str, top_k: usize) -> AppResult<Vec<ScoredTrend>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        if top_k == 0 {
            return Err(AppError::Validation("top_k must be at least 1".to_string()));
        }

        let query_embedding = self.provider.embed(query).await.map_err(into_unavailable)?;
        Ok(self.rank(&query_embedding, top_k))
    }

    /// Rank entries against an already-embedded query.
    pub fn rank(&self, query_embedding: &[f32], top_k: usize) -> Vec<ScoredTrend> {
        let mut scored: Vec<ScoredTrend> = self
            .entries
            .iter()
            .map(|(record, embedding)| ScoredTrend {
                record: record.clone(),
                score: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        // Stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        scored
    }
}

fn into_unavailable(err: AppError) -> AppError {
    match err {
        AppError::EmbeddingUnavailable(_) => err,
        other => AppError::EmbeddingUnavailable(other.to_string()),
    }
}

/// Cosine similarity; 0.0 for mismatched lengths or a zero-norm vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot_product / (norm_a * norm_b);
    if similarity.is_nan() {
        0.0
    } else {
        similarity
    }
}
