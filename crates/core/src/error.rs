//! Error types for trendcast.
//!
//! One enum covers every failure category in the workspace: page fetching and
//! parsing for the collectors, table access, embedding and generation for the
//! answering service, and request validation at the HTTP boundary.

use thiserror::Error;

/// Unified error type for trendcast.
///
/// All library functions return `Result<T, AppError>`. Collector-level
/// `Fetch`/`Parse` failures end that collector's run only; service-level
/// failures are converted to a JSON error body at the request boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network or HTTP failure fetching a source page
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Expected structure absent from fetched markup
    #[error("Parse error: {0}")]
    Parse(String),

    /// Expected table file missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Embedding capability failed to initialize or respond
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Text generation failed or returned unusable output
    #[error("Generation error: {0}")]
    Generation(String),

    /// Required request field missing or empty
    #[error("Validation error: {0}")]
    Validation(String),

    /// Prompt definition or rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Category name reported to HTTP clients in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "ConfigError",
            AppError::Io(_) => "IoError",
            AppError::Fetch(_) => "FetchError",
            AppError::Parse(_) => "ParseError",
            AppError::NotFound(_) => "NotFound",
            AppError::EmbeddingUnavailable(_) => "EmbeddingUnavailable",
            AppError::Generation(_) => "GenerationError",
            AppError::Validation(_) => "ValidationError",
            AppError::Prompt(_) => "PromptError",
            AppError::Serialization(_) => "SerializationError",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(AppError::Validation("x".into()).kind(), "ValidationError");
        assert_eq!(AppError::Generation("x".into()).kind(), "GenerationError");
        assert_eq!(AppError::NotFound("x".into()).kind(), "NotFound");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.to_string().contains("disk"));
    }
}
