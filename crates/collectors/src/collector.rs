//! The collector abstraction and the built-in collector set.

use crate::audio::TrendingAudioCollector;
use crate::fetch::PageFetcher;
use crate::reels::{ReelsCollector, ReelsSection};
use crate::twitter::TwitterTrendsCollector;
use async_trait::async_trait;
use trendcast_core::{AppResult, Table, TabularStore};

/// Scrapes one page and replaces one table with the result.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    fn url(&self) -> &str;

    fn table(&self) -> Table;

    /// Fetch, parse and persist. Returns the number of rows written.
    ///
    /// On any failure the previous table is left untouched.
    async fn collect(&self, fetcher: &PageFetcher, store: &TabularStore) -> AppResult<usize>;
}

/// All four collectors in their scheduled order.
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(TwitterTrendsCollector::new()),
        Box::new(ReelsCollector::new(ReelsSection::Current)),
        Box::new(ReelsCollector::new(ReelsSection::Archived)),
        Box::new(TrendingAudioCollector::new()),
    ]
}
