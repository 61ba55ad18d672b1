//! Trend collectors.
//!
//! Each collector scrapes one public page and replaces one table in the
//! [`TabularStore`](trendcast_core::TabularStore). Pages are parsed
//! synchronously after the fetch completes, so no parsed document is held
//! across an await point.

pub mod audio;
pub mod collector;
mod dom;
pub mod fetch;
pub mod poller;
pub mod reels;
pub mod runner;
pub mod twitter;

#[cfg(test)]
mod testing;

pub use audio::{parse_trending_audio, TrendingAudioCollector, TRENDING_AUDIO_URL};
pub use collector::{default_collectors, Collector};
pub use dom::parse_abbreviated_count;
pub use fetch::PageFetcher;
pub use poller::{poll, DEFAULT_POLL_INTERVAL};
pub use reels::{parse_reels_writeups, ReelsCollector, ReelsSection, REELS_TRENDS_URL};
pub use runner::{run_collectors, CollectionReport, CollectorOutcome, OutcomeStatus};
pub use twitter::{parse_twitter_trends, TwitterTrendsCollector, TWITTER_TRENDS_URL};
