//! HTTP answering service.
//!
//! Serves hashtag and content generation, trend-grounded answers and the
//! collected tables over JSON. The relevance index is rebuilt on demand
//! from the Twitter trends table and swapped in without blocking readers.

pub mod error;
pub mod handlers;
pub mod hashtags;
pub mod routes;
pub mod state;


pub use error::{ApiError, ApiResult, ErrorBody};
pub use hashtags::extract_hashtags;
pub use routes::{create_router, serve};
pub use state::{ServiceState, DEFAULT_TOPIC};
