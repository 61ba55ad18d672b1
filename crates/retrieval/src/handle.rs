//! Shared, atomically replaceable index.

use crate::embeddings::EmbeddingProvider;
use crate::index::RelevanceIndex;
use std::sync::{Arc, RwLock};
use trendcast_core::{AppResult, TrendRecord};

/// Holds the current index, if one has been built.
///
/// Readers take a snapshot (an `Arc` clone) and finish against it even if a
/// rebuild swaps in a new index meanwhile. The lock is only held for the
/// pointer read or swap, never across an embedding call.
#[derive(Debug, Clone, Default)]
pub struct IndexHandle {
    current: Arc<RwLock<Option<Arc<RelevanceIndex>>>>,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current index, or `None` if none was ever built.
    pub fn snapshot(&self) -> Option<Arc<RelevanceIndex>> {
        // Poisoning cannot leave the Option half-written; keep serving.
        let guard = self.current.read().unwrap_or_else(|p| p.into_inner());
        guard.clone()
    }

    /// Swap in `index`, returning the one it replaced.
    pub fn replace(&self, index: RelevanceIndex) -> Option<Arc<RelevanceIndex>> {
        let index = Arc::new(index);
        let mut guard = self.current.write().unwrap_or_else(|p| p.into_inner());
        guard.replace(index)
    }

    /// Build a new index off to the side, then swap it in.
    ///
    /// On failure the previous index stays in place.
    pub async fn rebuild(
        &self,
        records: Vec<TrendRecord>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<usize> {
        let index = RelevanceIndex::build(records, provider).await?;
        let count = index.len();
        self.replace(index);
        Ok(count)
    }

    pub fn is_initialized(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Number of records in the current index (0 when absent).
    pub fn len(&self) -> usize {
        self.snapshot().map(|index| index.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
