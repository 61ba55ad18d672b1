//! Instagram Reels trend write-ups from slayingsocial.
//!
//! The page keeps current and past trends under separate `h2` headings.
//! Each trend is a paragraph that opens with the trend name in `<strong>`
//! (often linking to example Reels) followed by the explanation.

use crate::collector::Collector;
use crate::dom::{selector, text_of};
use crate::fetch::PageFetcher;
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{info, instrument};
use trendcast_core::{AppError, AppResult, Table, TabularStore, TrendWriteup};

pub const REELS_TRENDS_URL: &str = "https://slayingsocial.com/instagram-reels-trends/";

/// Which section of the Reels page to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelsSection {
    /// First `h2` whose id contains `current-instagram-reels-trends-`
    Current,
    /// The `h2#past-instagram-reels-trends` section
    Archived,
}

impl ReelsSection {
    fn matches(&self, heading_id: &str) -> bool {
        match self {
            ReelsSection::Current => heading_id.contains("current-instagram-reels-trends-"),
            ReelsSection::Archived => heading_id == "past-instagram-reels-trends",
        }
    }

    fn table(&self) -> Table {
        match self {
            ReelsSection::Current => Table::CurrentReels,
            ReelsSection::Archived => Table::ArchivedReels,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReelsCollector {
    section: ReelsSection,
    url: String,
}

impl ReelsCollector {
    pub fn new(section: ReelsSection) -> Self {
        Self::with_url(section, REELS_TRENDS_URL)
    }

    pub fn with_url(section: ReelsSection, url: impl Into<String>) -> Self {
        Self {
            section,
            url: url.into(),
        }
    }

    pub fn section(&self) -> ReelsSection {
        self.section
    }
}

#[async_trait]
impl Collector for ReelsCollector {
    fn name(&self) -> &'static str {
        match self.section {
            ReelsSection::Current => "reels",
            ReelsSection::Archived => "archived",
        }
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn table(&self) -> Table {
        self.section.table()
    }

    #[instrument(level = "info", skip_all, fields(collector = "reels"))]
    async fn collect(&self, fetcher: &PageFetcher, store: &TabularStore) -> AppResult<usize> {
        let html = fetcher.fetch(&self.url).await?;
        let writeups = parse_reels_writeups(&html, self.section)?;
        info!(
            count = writeups.len(),
            section = ?self.section,
            source = %self.url,
            "Parsed Reels trends"
        );
        store.write(self.section.table(), &writeups).await
    }
}

/// Parse the write-ups under the `section` heading, stopping at the next
/// `h2`. A page without the heading is a `Parse` error.
pub fn parse_reels_writeups(html: &str, section: ReelsSection) -> AppResult<Vec<TrendWriteup>> {
    let document = Html::parse_document(html);
    let heading_selector = selector("h2[id]")?;
    let strong_selector = selector("strong")?;
    let link_selector = selector("a[href]")?;

    let heading = document
        .select(&heading_selector)
        .find(|h2| h2.value().attr("id").is_some_and(|id| section.matches(id)))
        .ok_or_else(|| AppError::Parse(format!("{:?} Reels trends section not found", section)))?;

    let mut writeups = Vec::new();
    let siblings = heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|element| element.value().name() != "h2");

    for paragraph in siblings.filter(|element| element.value().name() == "p") {
        let Some(strong) = paragraph.select(&strong_selector).next() else {
            continue;
        };

        let name = text_of(strong);
        if name.is_empty() {
            tracing::debug!("Skipping paragraph with an empty trend name");
            continue;
        }

        let links = strong
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect();
        let explanation = text_of(paragraph).replacen(&name, "", 1).trim().to_string();

        writeups.push(TrendWriteup {
            name,
            links,
            explanation,
        });
    }

    Ok(writeups)
}
