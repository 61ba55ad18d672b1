//! Trending topics for India from trends24.

use crate::collector::Collector;
use crate::dom::{parse_abbreviated_count, selector, text_of};
use crate::fetch::PageFetcher;
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use tracing::{info, instrument};
use trendcast_core::{AppError, AppResult, Table, TabularStore, TrendRecord};

pub const TWITTER_TRENDS_URL: &str = "https://trends24.in/india/";

/// Writes `TrendRecord` rows to the `twitter_trends` table.
#[derive(Debug, Clone)]
pub struct TwitterTrendsCollector {
    url: String,
}

impl TwitterTrendsCollector {
    pub fn new() -> Self {
        Self::with_url(TWITTER_TRENDS_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for TwitterTrendsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for TwitterTrendsCollector {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn table(&self) -> Table {
        Table::TwitterTrends
    }

    #[instrument(level = "info", skip_all, fields(collector = "twitter"))]
    async fn collect(&self, fetcher: &PageFetcher, store: &TabularStore) -> AppResult<usize> {
        let html = fetcher.fetch(&self.url).await?;
        let records = parse_twitter_trends(&html)?;
        info!(count = records.len(), source = %self.url, "Parsed trending topics");
        store.write(Table::TwitterTrends, &records).await
    }
}

/// Parse every `ol.trend-card__list li` item on the page.
///
/// Items with a `.trend-name` (or link) child take the name from it and the
/// count from `.tweet-count`; otherwise the item text is split into a name
/// and a trailing count. Missing counts are 0 and nameless items are
/// skipped.
pub fn parse_twitter_trends(html: &str) -> AppResult<Vec<TrendRecord>> {
    let document = Html::parse_document(html);
    let item_selector = selector("ol.trend-card__list li")?;
    let name_selector = selector(".trend-name")?;
    let link_selector = selector("a")?;
    let count_selector = selector(".tweet-count")?;
    let trailing_count = Regex::new(r"^(.*?)(\d+(?:\.\d+)?[KM]?)$")
        .map_err(|e| AppError::Parse(format!("Bad count pattern: {}", e)))?;

    let mut records = Vec::new();
    for item in document.select(&item_selector) {
        let named = item
            .select(&name_selector)
            .next()
            .or_else(|| item.select(&link_selector).next());

        let (name, count) = match named {
            Some(name_element) => {
                let count = item
                    .select(&count_selector)
                    .next()
                    .and_then(|c| parse_abbreviated_count(&text_of(c)))
                    .unwrap_or(0);
                (text_of(name_element), count)
            }
            None => {
                let text = text_of(item);
                match trailing_count.captures(&text) {
                    Some(caps) => (
                        caps[1].trim().to_string(),
                        parse_abbreviated_count(&caps[2]).unwrap_or(0),
                    ),
                    None => (text, 0),
                }
            }
        };

        if name.is_empty() {
            tracing::debug!("Skipping trend item without a name");
            continue;
        }
        records.push(TrendRecord::new(name, count));
    }

    Ok(records)
}
