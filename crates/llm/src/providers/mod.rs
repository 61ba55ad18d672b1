//! Text generation provider implementations.

pub mod gemini;

pub use gemini::{CandidateText, GeminiClient};
