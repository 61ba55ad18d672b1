//! Embedding providers for the relevance index.
//!
//! Provider-agnostic embedding generation selected by configuration.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
