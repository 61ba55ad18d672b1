//! Hashtag extraction from free-form model output.

/// Maximum hashtags returned to the caller.
pub const MAX_HASHTAGS: usize = 5;

/// Pull up to five hashtags out of `text`.
///
/// Whitespace-separated tokens starting with `#` are taken first. If there
/// are none, commas are treated as separators and any token containing a
/// `#` is cut to start at it. A bare `#` is never returned.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let leading: Vec<String> = text
        .split_whitespace()
        .filter(|token| token.starts_with('#') && *token != "#")
        .take(MAX_HASHTAGS)
        .map(str::to_string)
        .collect();

    if !leading.is_empty() {
        return leading;
    }

    text.replace(',', " ")
        .split_whitespace()
        .filter_map(|token| token.find('#').map(|at| &token[at..]))
        .filter(|tag| *tag != "#")
        .take(MAX_HASHTAGS)
        .map(str::to_string)
        .collect()
}
