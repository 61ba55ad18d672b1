//! Small helpers over `scraper` shared by the page parsers.

use scraper::{ElementRef, Html, Selector};
use trendcast_core::{AppError, AppResult};

/// Compile a CSS selector, mapping syntax errors to `Parse`.
pub(crate) fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::Parse(format!("Bad selector '{}': {}", css, e)))
}

/// Visible text of an element with runs of whitespace collapsed.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `tag` element that starts after `anchor` in document order.
///
/// Descendants of `anchor` count as "after", which is what a reader scanning
/// the page top to bottom would see next.
pub(crate) fn first_after<'a>(
    document: &'a Html,
    anchor: ElementRef<'a>,
    tag: &str,
) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != anchor.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == tag)
}

/// Parse a human count such as `12K`, `1.5M` or `3,400`.
///
/// Returns `None` when the text is not a number after stripping thousands
/// separators and a single `K`/`M` suffix.
pub fn parse_abbreviated_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let upper = cleaned.to_ascii_uppercase();

    let (number, multiplier) = if let Some(n) = upper.strip_suffix('K') {
        (n, 1_000.0)
    } else if let Some(n) = upper.strip_suffix('M') {
        (n, 1_000_000.0)
    } else {
        (upper.as_str(), 1.0)
    };

    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}
