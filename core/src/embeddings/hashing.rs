//! Deterministic feature-hashing embedding model.
//!
//! Texts are lowercased and split into word tokens; each word and each of its
//! padded character trigrams is hashed (SHA-256) into a signed bucket. Shared
//! words dominate the similarity, shared trigrams give partial credit to
//! inflections ("hearing" / "hearings"). The same text always produces the
//! same vector, across processes and platforms, so persisted indexes stay
//! valid after a restart.

use super::EmbeddingError;
use super::EmbeddingProvider;
use super::EmbeddingVector;
use sha2::Digest;
use sha2::Sha256;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.25;

/// Local embedding model with no external dependencies.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self, EmbeddingError> {
        if dimensions == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "hashing embedder needs at least one dimension".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    /// Embed synchronously; the async trait methods delegate here.
    pub fn embed_text(&self, text: &str) -> EmbeddingVector {
        let mut vector = vec![0.0; self.dimensions];
        for word in tokenize(text) {
            self.accumulate(&mut vector, &format!("w:{word}"), WORD_WEIGHT);

            let padded: Vec<char> = format!("^{word}$").chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.accumulate(&mut vector, &format!("g:{gram}"), TRIGRAM_WEIGHT);
            }
        }
        vector
    }

    fn accumulate(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bucket_bytes = [0u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn model_id(&self) -> String {
        format!("hashing:sha256-{}", self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::cosine_similarity;

    fn embedder() -> HashingEmbedder {
        HashingEmbedder::new(384).unwrap()
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            HashingEmbedder::new(0),
            Err(EmbeddingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_same_text_same_vector() {
        let e = embedder();
        assert_eq!(e.embed_text("Blood pressure"), e.embed_text("Blood pressure"));
        assert_eq!(e.embed_text("Blood pressure").len(), 384);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let e = embedder();
        let a = e.embed_text("Court hearing");
        let b = e.embed_text("court hearing!");
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_words_score_higher() {
        let e = embedder();
        let query = e.embed_text("court hearing");
        let legal = e.embed_text("Court hearing");
        let medical = e.embed_text("Heart rate");
        assert!(cosine_similarity(&query, &legal) > cosine_similarity(&query, &medical));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let e = embedder();
        let v = e.embed_text("");
        assert_eq!(v.len(), 384);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let e = embedder();
        let texts = vec!["Heart rate".to_string(), "Blood pressure".to_string()];
        let vectors = e.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors[0], e.embed_text("Heart rate"));
        assert_eq!(vectors[1], e.embed_text("Blood pressure"));
        assert_eq!(e.embed("Heart rate").await.unwrap(), vectors[0]);
    }

    #[test]
    fn test_non_latin_scripts_tokenize() {
        let e = embedder();
        let v = e.embed_text("بلڈ پریشر");
        assert!(v.iter().any(|x| *x != 0.0));
    }
}
