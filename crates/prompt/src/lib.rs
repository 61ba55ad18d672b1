//! Prompt system for trendcast.
//!
//! This crate provides structured prompt management with:
//! - YAML prompt definitions, built in and overridable per workspace
//! - Handlebars template rendering
//! - Trend context injection
//! - The fixed style-rewrite table

pub mod builder;
pub mod loader;
pub mod style;
pub mod types;

// Re-export main types
pub use builder::{trend_context, PromptLibrary};
pub use loader::{ASKAI_FALLBACK, ASKAI_REWRITE, ASKAI_TRENDS, CONTENT_GENERATE, HASHTAGS_GENERATE};
pub use style::{style_instruction, STYLE_REWRITES};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
