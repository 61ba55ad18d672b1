//! Hashed bag-of-words embedding provider.

use crate::embeddings::provider::EmbeddingProvider;
use std::collections::HashMap;
use trendcast_core::AppResult;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "on", "a", "an", "as", "are", "was", "for", "to", "of", "in", "and", "or",
    "with", "by", "from", "this", "that", "it", "twitter", "trend", "tweet", "count",
];

/// Deterministic local embeddings for offline use and tests.
///
/// Each word and each of its character trigrams is hashed into a bucket;
/// the vector is then scaled to unit length. Texts with no usable words
/// embed to the zero vector. Not semantic, but stable and content-dependent.
#[derive(Debug)]
pub struct HashedProvider {
    dimensions: usize,
}

impl HashedProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        // FNV-1a
        let hash = token.bytes().fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
            (acc ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        });
        (hash % self.dimensions as u64) as usize
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        // Hashtags and counts split apart: "#IPL2025" -> "ipl2025"
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            embedding[self.bucket(word)] += *freq as f32;

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[self.bucket(&trigram)] += (*freq as f32).sqrt();
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }
        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashedProvider {
    fn provider_name(&self) -> &str {
        "hashed"
    }

    fn model_name(&self) -> &str {
        "hashed-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn test_embed_is_unit_length() {
        let provider = HashedProvider::new(128);
        let embedding = provider.embed("#IPL2025 final tonight").await.unwrap();

        assert_eq!(embedding.len(), 128);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = HashedProvider::new(128);
        let a = provider.embed("Monsoon session").await.unwrap();
        let b = provider.embed("Monsoon session").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let provider = HashedProvider::new(128);
        let a = provider.embed("cricket world cup").await.unwrap();
        let b = provider.embed("stock market rally").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = HashedProvider::new(64);
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));

        let only_stop_words = provider.embed("the and of").await.unwrap();
        assert!(only_stop_words.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_utf8_text() {
        let provider = HashedProvider::new(64);
        let embedding = provider.embed("दिवाली 🎆 celebrations").await.unwrap();
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let provider = HashedProvider::new(64);
        let texts = vec!["first trend".to_string(), "second trend".to_string()];

        let batch = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], provider.embed("second trend").await.unwrap());
    }
}
