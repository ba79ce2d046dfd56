//! LRU cache in front of any embedding provider. Identical texts within the
//! cache capacity are embedded once.

use super::EmbeddingError;
use super::EmbeddingProvider;
use super::EmbeddingVector;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use tracing::trace;

pub struct CachedEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    cache: Mutex<LruCache<String, EmbeddingVector>>,
}

impl CachedEmbedder {
    /// Wrap `inner` with a cache of at most `capacity` texts (minimum one).
    pub fn new(inner: Arc<dyn EmbeddingProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, EmbeddingVector>> {
        // Entries are inserted whole, so a poisoned lock still holds valid data.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CachedEmbedder {
    fn model_id(&self) -> String {
        self.inner.model_id()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        let mut results: Vec<Option<EmbeddingVector>> = {
            let mut cache = self.lock();
            texts.iter().map(|text| cache.get(text).cloned()).collect()
        };

        // Distinct missing texts, each mapped to its slot in `misses`.
        let mut miss_slots: HashMap<&str, usize> = HashMap::new();
        let mut misses: Vec<String> = Vec::new();
        for (text, slot) in texts.iter().zip(&results) {
            if slot.is_none() && !miss_slots.contains_key(text.as_str()) {
                miss_slots.insert(text, misses.len());
                misses.push(text.clone());
            }
        }
        trace!(
            "Embedding cache: {} hits, {} misses",
            results.iter().filter(|r| r.is_some()).count(),
            misses.len()
        );

        if misses.is_empty() {
            return Ok(results.into_iter().flatten().collect());
        }

        let fresh = self.inner.embed_batch(&misses).await?;
        if fresh.len() != misses.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: misses.len(),
                actual: fresh.len(),
            });
        }

        {
            let mut cache = self.lock();
            for (text, vector) in misses.iter().zip(&fresh) {
                cache.put(text.clone(), vector.clone());
            }
        }

        for (text, slot) in texts.iter().zip(results.iter_mut()) {
            if slot.is_none() {
                *slot = miss_slots.get(text.as_str()).map(|&i| fresh[i].clone());
            }
        }
        Ok(results.into_iter().flatten().collect())
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
