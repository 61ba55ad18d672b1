//! Row types produced by the collectors and persisted as CSV tables.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One trending topic with its observed post count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRecord {
    #[serde(rename = "Trend")]
    pub text: String,

    #[serde(rename = "Count", default)]
    pub count: u64,
}

impl TrendRecord {
    pub fn new(text: impl Into<String>, count: u64) -> Self {
        Self {
            text: text.into(),
            count,
        }
    }
}

/// A Reels trend write-up: a named trend, example links and an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendWriteup {
    #[serde(rename = "Trend Name")]
    pub name: String,

    /// Stored in a single CSV column, comma-joined.
    #[serde(
        rename = "Links",
        serialize_with = "join_links",
        deserialize_with = "split_links",
        default
    )]
    pub links: Vec<String>,

    #[serde(rename = "Explanation", default)]
    pub explanation: String,
}

/// A trending Reels audio track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingSong {
    pub song_name: String,
    pub artist_name: String,
    pub reels_count: u64,
    pub song_link: String,
    pub description: String,
    pub likes: String,
}

fn join_links<S: Serializer>(links: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&links.join(","))
}

fn split_links<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writeup_links_json_roundtrip_uses_joined_form() {
        let writeup = TrendWriteup {
            name: "Photo dump".to_string(),
            links: vec!["https://a.example/1".to_string(), "https://b.example/2".to_string()],
            explanation: "Carousel of candid shots".to_string(),
        };

        let json = serde_json::to_value(&writeup).unwrap();
        assert_eq!(json["Links"], "https://a.example/1,https://b.example/2");

        let back: TrendWriteup = serde_json::from_value(json).unwrap();
        assert_eq!(back, writeup);
    }

    #[test]
    fn test_empty_links_column() {
        let back: TrendWriteup = serde_json::from_value(serde_json::json!({
            "Trend Name": "Silent trend",
            "Links": "",
            "Explanation": "No examples"
        }))
        .unwrap();
        assert!(back.links.is_empty());
    }
}
