//! trendcast core library
//!
//! Foundational pieces shared by every trendcast crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Trend row types and the CSV table store

pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{ApiKey, AppConfig};
pub use error::{AppError, AppResult};
pub use store::{Table, TabularStore};
pub use types::{TrendRecord, TrendWriteup, TrendingSong};
