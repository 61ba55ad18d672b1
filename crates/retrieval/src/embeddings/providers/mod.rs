//! Embedding provider implementations.

pub mod gemini;
pub mod hashed;
pub mod ollama;

pub use gemini::GeminiEmbeddingProvider;
pub use hashed::HashedProvider;
pub use ollama::OllamaProvider;
