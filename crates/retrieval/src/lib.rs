//! Relevance retrieval for trendcast.
//!
//! Embeds trend records with a configurable provider and answers top-k
//! cosine-similarity queries against them. The index is rebuilt wholesale
//! and published through [`IndexHandle`], so queries never observe a
//! partially built index.

pub mod embeddings;
pub mod handle;
pub mod index;


// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use handle::IndexHandle;
pub use index::{canonical_text, cosine_similarity, RelevanceIndex, ScoredTrend};
