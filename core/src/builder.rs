//! Corpus to index pipeline.

use crate::artifacts::ArtifactStore;
use crate::corpus::CorpusStore;
use crate::embeddings::EmbeddingError;
use crate::embeddings::EmbeddingProvider;
use crate::embeddings::l2_normalize;
use crate::error::Result;
use crate::index::FlatIpIndex;
use crate::index::VectorIndex;
use crate::language::Language;
use crate::registry::IndexRegistry;
use crate::registry::LoadedIndex;
use crate::types::MetadataRecord;
use tracing::info;
use tracing::warn;

/// Result of a build that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Built { vectors: usize, dimensions: usize },
    /// The corpus file is missing or holds no entries.
    NoData,
    /// No entry has text in the source language.
    NoUsableEntries,
}

impl BuildOutcome {
    pub const fn is_built(&self) -> bool {
        matches!(self, Self::Built { .. })
    }
}

/// Embeds a corpus, persists the artifact pair and installs it.
pub struct IndexBuilder<'a> {
    store: &'a CorpusStore,
    artifacts: &'a ArtifactStore,
    provider: &'a dyn EmbeddingProvider,
    registry: &'a IndexRegistry,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(
        store: &'a CorpusStore,
        artifacts: &'a ArtifactStore,
        provider: &'a dyn EmbeddingProvider,
        registry: &'a IndexRegistry,
    ) -> Self {
        Self {
            store,
            artifacts,
            provider,
            registry,
        }
    }

    /// Rebuild the index for `corpus_name` from scratch.
    ///
    /// Every entry carrying `source_language` text is embedded, blank text
    /// included; its metadata record keeps every translation and the entry's
    /// position in the corpus file. When nothing is left to index, any
    /// previous artifacts and registry entry for the corpus are dropped.
    pub async fn build(&self, corpus_name: &str, source_language: &Language) -> Result<BuildOutcome> {
        let entries = self.store.load(corpus_name)?;
        if entries.is_empty() {
            warn!("No data found for corpus {}", corpus_name);
            self.discard(corpus_name)?;
            return Ok(BuildOutcome::NoData);
        }

        let mut texts = Vec::new();
        let mut metadata = Vec::new();
        for (position, entry) in entries.into_iter().enumerate() {
            let Some(text) = entry.get(source_language) else {
                continue;
            };
            texts.push(text.to_string());
            metadata.push(MetadataRecord {
                corpus: corpus_name.to_string(),
                position,
                translations: entry,
            });
        }

        if texts.is_empty() {
            warn!(
                "Corpus {} has no entries with {} text",
                corpus_name,
                source_language.display_name()
            );
            self.discard(corpus_name)?;
            return Ok(BuildOutcome::NoUsableEntries);
        }

        info!(
            "Embedding {} entries of {} with {}",
            texts.len(),
            corpus_name,
            self.provider.model_id()
        );
        let mut vectors = self.provider.embed_batch(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            }
            .into());
        }
        for vector in &mut vectors {
            l2_normalize(vector);
        }

        let dimensions = vectors
            .first()
            .map_or(self.provider.dimensions(), Vec::len);
        let mut index = FlatIpIndex::new(dimensions)?;
        index.add(&vectors)?;

        let build_id = self.artifacts.save(corpus_name, &index, &metadata)?;
        let count = index.len();
        self.registry.insert(
            corpus_name,
            LoadedIndex::new(Box::new(index), metadata, build_id)?,
        );

        info!(
            "Built index for {}: {} vectors, {} dimensions",
            corpus_name, count, dimensions
        );
        Ok(BuildOutcome::Built {
            vectors: count,
            dimensions,
        })
    }

    fn discard(&self, corpus_name: &str) -> Result<()> {
        let removed = self.artifacts.remove(corpus_name)?;
        if self.registry.remove(corpus_name) || removed {
            info!("Dropped stale index for {}", corpus_name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Entry;
    use crate::embeddings::EmbeddingVector;
    use crate::embeddings::HashingEmbedder;
    use polyglot_persistence::CompressionLevel;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: CorpusStore,
        artifacts: ArtifactStore,
        registry: IndexRegistry,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        Fixture {
            store: CorpusStore::new(dir.path()),
            artifacts: ArtifactStore::new(dir.path(), CompressionLevel::Fast),
            registry: IndexRegistry::new(),
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_build_skips_entries_without_source() {
        let f = fixture();
        f.store
            .save(
                "medical",
                &[
                    Entry::from_pairs([("en", "Blood pressure"), ("es", "Presión arterial")]),
                    Entry::from_pairs([("es", "Solo español")]),
                    Entry::from_pairs([("en", "Heart rate"), ("es", "Frecuencia cardíaca")]),
                ],
            )
            .unwrap();
        let provider = HashingEmbedder::new(64).unwrap();
        let builder = IndexBuilder::new(&f.store, &f.artifacts, &provider, &f.registry);

        let outcome = builder.build("medical", &Language::English).await.unwrap();
        assert_eq!(
            outcome,
            BuildOutcome::Built {
                vectors: 2,
                dimensions: 64
            }
        );

        let loaded = f.registry.get("medical").unwrap();
        let positions: Vec<usize> = loaded.metadata().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![0, 2]);
        assert_eq!(
            loaded.metadata()[1].translation(&Language::Spanish),
            Some("Frecuencia cardíaca")
        );
        assert!(f.artifacts.exists("medical"));
    }

    #[tokio::test]
    async fn test_missing_corpus_is_no_data() {
        let f = fixture();
        let provider = HashingEmbedder::new(8).unwrap();
        let builder = IndexBuilder::new(&f.store, &f.artifacts, &provider, &f.registry);
        assert_eq!(
            builder.build("legal", &Language::English).await.unwrap(),
            BuildOutcome::NoData
        );
        assert!(!f.artifacts.exists("legal"));
    }

    #[tokio::test]
    async fn test_no_source_text_is_no_usable_entries() {
        let f = fixture();
        f.store
            .save("legal", &[Entry::from_pairs([("es", "Audiencia judicial")])])
            .unwrap();
        let provider = HashingEmbedder::new(8).unwrap();
        let builder = IndexBuilder::new(&f.store, &f.artifacts, &provider, &f.registry);
        assert_eq!(
            builder.build("legal", &Language::English).await.unwrap(),
            BuildOutcome::NoUsableEntries
        );
        assert!(!f.registry.is_loaded("legal"));
    }

    #[tokio::test]
    async fn test_blank_source_text_is_still_indexed() {
        let f = fixture();
        f.store
            .save(
                "notes",
                &[
                    Entry::from_pairs([("en", ""), ("es", "vacío")]),
                    Entry::from_pairs([("en", "x")]),
                ],
            )
            .unwrap();
        let provider = HashingEmbedder::new(64).unwrap();
        let builder = IndexBuilder::new(&f.store, &f.artifacts, &provider, &f.registry);

        assert_eq!(
            builder.build("notes", &Language::English).await.unwrap(),
            BuildOutcome::Built {
                vectors: 2,
                dimensions: 64
            }
        );
        let loaded = f.registry.get("notes").unwrap();
        assert_eq!(loaded.metadata()[0].translation(&Language::Spanish), Some("vacío"));
    }

    #[tokio::test]
    async fn test_rebuild_without_usable_entries_drops_old_index() {
        let f = fixture();
        f.store
            .save("legal", &[Entry::from_pairs([("en", "Court hearing")])])
            .unwrap();
        let provider = HashingEmbedder::new(16).unwrap();
        let builder = IndexBuilder::new(&f.store, &f.artifacts, &provider, &f.registry);
        assert!(builder.build("legal", &Language::English).await.unwrap().is_built());

        f.store
            .save("legal", &[Entry::from_pairs([("es", "solo")])])
            .unwrap();
        assert_eq!(
            builder.build("legal", &Language::English).await.unwrap(),
            BuildOutcome::NoUsableEntries
        );
        assert!(!f.registry.is_loaded("legal"));
        assert!(!f.artifacts.exists("legal"));

        f.store.save("legal", &[]).unwrap();
        assert_eq!(
            builder.build("legal", &Language::English).await.unwrap(),
            BuildOutcome::NoData
        );
    }

    struct ShortProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for ShortProvider {
        fn model_id(&self) -> String {
            "short".to_string()
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed_batch(
            &self,
            _texts: &[String],
        ) -> std::result::Result<Vec<EmbeddingVector>, EmbeddingError> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    #[tokio::test]
    async fn test_provider_count_mismatch_fails_build() {
        let f = fixture();
        f.store
            .save(
                "legal",
                &[
                    Entry::from_pairs([("en", "Court hearing")]),
                    Entry::from_pairs([("en", "Legal agreement")]),
                ],
            )
            .unwrap();
        let builder = IndexBuilder::new(&f.store, &f.artifacts, &ShortProvider, &f.registry);
        let err = builder.build("legal", &Language::English).await.unwrap_err();
        assert!(err.is_provider_failure());
        assert!(!f.artifacts.exists("legal"));
    }
}
