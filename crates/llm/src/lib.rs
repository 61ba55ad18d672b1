//! Text generation crate for trendcast.
//!
//! A provider-agnostic abstraction over hosted text generation, with the
//! Gemini API as the supported provider.
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use trendcast_core::ApiKey;
//! use trendcast_llm::{GeminiClient, LlmClient, LlmRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("gemini-2.5-flash", ApiKey::new("..."), Duration::from_secs(60))?;
//! let response = client.complete(&LlmRequest::new("Suggest a caption")).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod retry;

// Re-export main types
pub use client::{LlmClient, LlmError, LlmRequest, LlmResponse, LlmResult, LlmUsage};
pub use factory::create_client;
pub use providers::{CandidateText, GeminiClient};
pub use retry::RetryingClient;
