//! Multi-corpus retrieval engine.
//!
//! The engine owns the corpus store, the artifact store, the embedding
//! provider and the index registry. Indexes are loaded lazily: the first
//! search touching a corpus reads its artifact pair from disk, later searches
//! reuse the registered copy until it is rebuilt or unloaded.
//!
//! Results from several corpora are merged by score. Ties are broken by
//! corpus name and then by position inside the corpus index, so the same
//! query against the same artifacts always returns the same list.

use crate::artifacts::ArtifactStore;
use crate::builder::BuildOutcome;
use crate::builder::IndexBuilder;
use crate::catalog::Catalog;
use crate::catalog::CorpusStats;
use crate::config::PolyglotConfig;
use crate::context::ContextAssembler;
use crate::corpus::CorpusStore;
use crate::corpus::validate_name;
use crate::embeddings::EmbeddingProvider;
use crate::embeddings::create_provider;
use crate::embeddings::l2_normalize;
use crate::error::Result;
use crate::index::IndexError;
use crate::language::Domain;
use crate::language::Language;
use crate::registry::IndexRegistry;
use crate::registry::LoadedIndex;
use crate::types::SearchResult;
use polyglot_persistence::CompressionLevel;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Best-matching corpus for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainMatch {
    pub corpus: String,
    pub domain: Option<Domain>,
    pub score: f32,
}

/// What `initialize` did for each catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub loaded: Vec<String>,
    pub built: Vec<String>,
    pub skipped: Vec<String>,
}

pub struct RetrievalEngine {
    store: CorpusStore,
    artifacts: ArtifactStore,
    provider: Arc<dyn EmbeddingProvider>,
    registry: IndexRegistry,
    source_language: Language,
    assembler: ContextAssembler,
}

impl RetrievalEngine {
    /// Engine over `config.corpus_dir` with the configured provider.
    pub fn from_config(config: &PolyglotConfig) -> Result<Self> {
        let provider = create_provider(&config.embeddings)?;
        Self::new(
            &config.corpus_dir,
            provider,
            config.source_language.clone(),
            config.compression,
        )
    }

    /// Engine over `corpus_dir`. Corpora with artifacts already on disk are
    /// registered as search candidates; nothing is loaded yet.
    pub fn new(
        corpus_dir: &Path,
        provider: Arc<dyn EmbeddingProvider>,
        source_language: Language,
        compression: CompressionLevel,
    ) -> Result<Self> {
        let engine = Self {
            store: CorpusStore::new(corpus_dir),
            artifacts: ArtifactStore::new(corpus_dir, compression),
            provider,
            registry: IndexRegistry::new(),
            assembler: ContextAssembler::new(source_language.clone()),
            source_language,
        };

        let discovered = engine.artifacts.discover()?;
        for name in &discovered {
            engine.registry.register(name);
        }
        info!(
            "Retrieval engine over {} ({} indexed corpora on disk, provider {})",
            corpus_dir.display(),
            discovered.len(),
            engine.provider.model_id()
        );
        Ok(engine)
    }

    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    pub fn source_language(&self) -> &Language {
        &self.source_language
    }

    /// Rebuild `name` from its corpus file, replacing any previous index.
    pub async fn build_index(&self, name: &str) -> Result<BuildOutcome> {
        validate_name(name)?;
        IndexBuilder::new(
            &self.store,
            &self.artifacts,
            self.provider.as_ref(),
            &self.registry,
        )
        .build(name, &self.source_language)
        .await
    }

    /// Load the persisted pair for `name` into the registry.
    /// Returns false when no usable pair exists.
    pub fn load_index(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        match self.artifacts.load(name)? {
            Some(loaded) => {
                self.registry.insert(name, loaded);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop the in-memory index for `name`; it is reloaded on next use.
    pub fn unload(&self, name: &str) -> bool {
        self.registry.remove(name)
    }

    /// Make `name` a cross-corpus search candidate.
    pub fn register_corpus(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        Ok(self.registry.register(name))
    }

    pub fn known_corpora(&self) -> Vec<String> {
        self.registry.known()
    }

    /// The loaded index for `name`, reading it from disk on first use.
    /// Unreadable artifacts are logged and treated as absent.
    fn resolve(&self, name: &str) -> Option<Arc<LoadedIndex>> {
        if let Some(loaded) = self.registry.get(name) {
            return Some(loaded);
        }
        match self.artifacts.load(name) {
            Ok(Some(loaded)) => {
                self.registry.insert(name, loaded);
                self.registry.get(name)
            }
            Ok(None) => {
                debug!("No index available for {}", name);
                None
            }
            Err(e) => {
                warn!("Failed to load index for {}: {}", name, e);
                None
            }
        }
    }

    /// Up to `k` entries most similar to `query`, best first.
    ///
    /// With `corpus` set only that corpus is searched; otherwise every known
    /// corpus is. Corpora without an index contribute nothing. An empty
    /// result is not an error.
    pub async fn search_similar(
        &self,
        query: &str,
        corpus: Option<&str>,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let candidates = match corpus {
            Some(name) => {
                if validate_name(name).is_err() {
                    debug!("No corpus can be named {:?}", name);
                    return Ok(Vec::new());
                }
                vec![name.to_string()]
            }
            None => self.registry.known(),
        };
        let indexes: Vec<(String, Arc<LoadedIndex>)> = candidates
            .into_iter()
            .filter_map(|name| self.resolve(&name).map(|loaded| (name, loaded)))
            .collect();
        if indexes.is_empty() {
            debug!("No indexed corpora to search for {:?}", corpus);
            return Ok(Vec::new());
        }

        let mut query_vector = self.provider.embed(query).await?;
        l2_normalize(&mut query_vector);

        let mut merged: Vec<(usize, SearchResult)> = Vec::new();
        for (name, loaded) in &indexes {
            match loaded.search(name, &query_vector, k) {
                Ok(hits) => merged.extend(hits),
                Err(IndexError::DimensionMismatch { expected, actual }) => warn!(
                    "Skipping {}: index has {} dimensions, query has {}; rebuild it",
                    name, expected, actual
                ),
                Err(e) => return Err(e.into()),
            }
        }

        merged.sort_by(|(pos_a, a), (pos_b, b)| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.corpus.cmp(&b.corpus))
                .then_with(|| pos_a.cmp(pos_b))
        });
        merged.truncate(k);

        debug!(
            "Search over {} corpora returned {} results",
            indexes.len(),
            merged.len()
        );
        Ok(merged.into_iter().map(|(_, result)| result).collect())
    }

    /// Formatted few-shot examples for translating `query` into `target`.
    ///
    /// Returns `""` when nothing qualifies or the provider fails.
    pub async fn get_context_examples(
        &self,
        query: &str,
        target: &Language,
        max_examples: usize,
    ) -> String {
        if max_examples == 0 {
            return String::new();
        }
        let k = ContextAssembler::candidate_count(max_examples);
        match self.search_similar(query, None, k).await {
            Ok(results) => self.assembler.assemble(&results, target, max_examples),
            Err(e) => {
                warn!("Could not assemble translation examples: {}", e);
                String::new()
            }
        }
    }

    /// Register every catalog source, loading its index or building it when
    /// no usable artifacts exist.
    pub async fn initialize(&self, catalog: &Catalog) -> Result<InitReport> {
        let mut report = InitReport::default();
        for source in catalog.iter() {
            self.register_corpus(&source.name)?;
            if self.load_index(&source.name)? {
                report.loaded.push(source.name.clone());
                continue;
            }
            if self.build_index(&source.name).await?.is_built() {
                report.built.push(source.name.clone());
            } else {
                report.skipped.push(source.name.clone());
            }
        }
        info!(
            "Initialized corpora: {} loaded, {} built, {} skipped",
            report.loaded.len(),
            report.built.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Entry and index counts for every catalog source.
    pub fn stats(&self, catalog: &Catalog) -> Result<Vec<CorpusStats>> {
        catalog
            .iter()
            .map(|source| -> Result<CorpusStats> {
                let entries = self.store.load(&source.name)?.len();
                let vectors = self.resolve(&source.name).map_or(0, |loaded| loaded.len());
                Ok(CorpusStats {
                    name: source.name.clone(),
                    display_name: source.display_name.clone(),
                    description: source.description.clone(),
                    domain: source.domain,
                    entries,
                    indexed: self.registry.is_loaded(&source.name),
                    vectors,
                })
            })
            .collect()
    }

    /// The corpus whose best entry is closest to `query`, with its domain
    /// from the catalog or, failing that, from the corpus file.
    pub async fn classify_domain(&self, query: &str, catalog: &Catalog) -> Result<Option<DomainMatch>> {
        let Some(best) = self.search_similar(query, None, 1).await?.into_iter().next() else {
            return Ok(None);
        };
        let domain = match catalog.domain_of(&best.corpus) {
            Some(domain) => Some(domain),
            None => self
                .store
                .load_corpus(&best.corpus)?
                .and_then(|corpus| corpus.domain),
        };
        Ok(Some(DomainMatch {
            corpus: best.corpus,
            domain,
            score: best.score,
        }))
    }
}
