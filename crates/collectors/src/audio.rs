//! Trending Reels audio from the socialbu blog.
//!
//! The article is a flat run of `li` items in pairs: the song item links to
//! the Instagram audio page as "Song - Artist", and the item after it reads
//! "# of Reels: 12.5K".

use crate::collector::Collector;
use crate::dom::{first_after, parse_abbreviated_count, selector, text_of};
use crate::fetch::PageFetcher;
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::{debug, info, instrument};
use trendcast_core::{AppResult, Table, TabularStore, TrendingSong};

pub const TRENDING_AUDIO_URL: &str =
    "https://socialbu.com/blog/trending-songs-on-instagram-reels/";

const UNKNOWN_ARTIST: &str = "Unknown";
const NO_LIKES: &str = "N/A";

#[derive(Debug, Clone)]
pub struct TrendingAudioCollector {
    url: String,
}

impl TrendingAudioCollector {
    pub fn new() -> Self {
        Self::with_url(TRENDING_AUDIO_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for TrendingAudioCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for TrendingAudioCollector {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn table(&self) -> Table {
        Table::TrendingAudio
    }

    #[instrument(level = "info", skip_all, fields(collector = "audio"))]
    async fn collect(&self, fetcher: &PageFetcher, store: &TabularStore) -> AppResult<usize> {
        let html = fetcher.fetch(&self.url).await?;
        let songs = parse_trending_audio(&html)?;
        info!(count = songs.len(), source = %self.url, "Parsed trending audio");
        store.write(Table::TrendingAudio, &songs).await
    }
}

/// Parse song/count `li` pairs, most-used audio first.
///
/// Songs whose link is not on instagram.com are skipped, as are songs whose
/// count item is present but not numeric. A song with no count item after
/// it gets a count of 0.
pub fn parse_trending_audio(html: &str) -> AppResult<Vec<TrendingSong>> {
    let document = Html::parse_document(html);
    let item_selector = selector("li")?;
    let link_selector = selector("a")?;

    let items: Vec<ElementRef<'_>> = document.select(&item_selector).collect();
    let mut songs = Vec::new();

    for i in (0..items.len()).step_by(2) {
        let song_item = items[i];
        let Some(link) = song_item.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.contains("instagram.com") {
            continue;
        }

        let song_text = text_of(link);
        let (song_name, artist_name) = match song_text.split_once(" - ") {
            Some((song, artist)) => (song.trim().to_string(), artist.trim().to_string()),
            None => (song_text.clone(), UNKNOWN_ARTIST.to_string()),
        };

        let reels_count = match items.get(i + 1) {
            Some(count_item) => {
                let raw = text_of(*count_item).replace("# of Reels:", "");
                match parse_abbreviated_count(&raw) {
                    Some(count) => count,
                    None => {
                        debug!(song = %song_name, count = %raw, "Skipping song with unreadable count");
                        continue;
                    }
                }
            }
            None => 0,
        };

        let paragraph = first_after(&document, song_item, "p");
        let description = paragraph.map(text_of).unwrap_or_default();
        let likes = paragraph
            .and_then(|p| first_after(&document, p, "strong"))
            .map(text_of)
            .unwrap_or_else(|| NO_LIKES.to_string());

        songs.push(TrendingSong {
            song_name,
            artist_name,
            reels_count,
            song_link: href.to_string(),
            description,
            likes,
        });
    }

    // Stable, so equal counts keep page order
    songs.sort_by(|a, b| b.reels_count.cmp(&a.reels_count));
    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
<html><body>
  <nav><ul><li><a href="/blog">Blog</a></li><li><a href="/pricing">Pricing</a></li></ul></nav>
  <h3>1. Espresso</h3>
  <ul>
    <li><a href="https://www.instagram.com/reels/audio/111/">Espresso - Sabrina Carpenter</a></li>
    <li># of Reels: 1.2M</li>
  </ul>
  <p>Upbeat summer track used for outfit transitions.</p>
  <p><strong>Likes: 3.4M</strong></p>
  <ul>
    <li><a href="https://www.instagram.com/reels/audio/222/">Original Audio</a></li>
    <li># of Reels: 85,000</li>
  </ul>
  <p>Voiceover meme.</p>
  <ul>
    <li><a href="https://www.instagram.com/reels/audio/333/">Bad Count - Someone</a></li>
    <li># of Reels: lots</li>
  </ul>
  <ul>
    <li><a href="https://open.spotify.com/track/444">Elsewhere - Band</a></li>
    <li># of Reels: 9M</li>
  </ul>
  <ul>
    <li><a href="https://www.instagram.com/reels/audio/555/">Tum Hi Ho - Arijit Singh</a></li>
    <li># of Reels: 2,500K</li>
  </ul>
  <p>Romantic edits.</p>
</body></html>
"#;

    #[test]
    fn test_parse_song_pairs() {
        let songs = parse_trending_audio(FIXTURE).unwrap();
        let names: Vec<&str> = songs.iter().map(|s| s.song_name.as_str()).collect();
        assert_eq!(names, vec!["Tum Hi Ho", "Espresso", "Original Audio"]);

        let espresso = &songs[1];
        assert_eq!(espresso.artist_name, "Sabrina Carpenter");
        assert_eq!(espresso.reels_count, 1_200_000);
        assert_eq!(espresso.song_link, "https://www.instagram.com/reels/audio/111/");
        assert_eq!(
            espresso.description,
            "Upbeat summer track used for outfit transitions."
        );
        assert_eq!(espresso.likes, "Likes: 3.4M");

        let original = &songs[2];
        assert_eq!(original.artist_name, "Unknown");
        assert_eq!(original.reels_count, 85_000);
        assert_eq!(original.description, "Voiceover meme.");

        assert_eq!(songs[0].reels_count, 2_500_000);
        assert_eq!(songs[0].likes, "N/A");
    }

    #[test]
    fn test_trailing_song_without_count_item_is_zero() {
        let html = r#"<ul><li><a href="https://instagram.com/a/1">Last - Artist</a></li></ul>"#;
        let songs = parse_trending_audio(html).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].reels_count, 0);
        assert_eq!(songs[0].description, "");
        assert_eq!(songs[0].likes, "N/A");
    }

    #[test]
    fn test_equal_counts_keep_page_order() {
        let html = r#"<ul>
            <li><a href="https://instagram.com/a/1">First - A</a></li><li># of Reels: 10K</li>
            <li><a href="https://instagram.com/a/2">Second - B</a></li><li># of Reels: 10,000</li>
        </ul>"#;
        let songs = parse_trending_audio(html).unwrap();
        assert_eq!(songs[0].song_name, "First");
        assert_eq!(songs[1].song_name, "Second");
    }
}
