//! In-memory registry of loaded corpus indexes.
//!
//! Each corpus name maps to one [`LoadedIndex`] holding the vector index and
//! its metadata as a single value. Replacing an entry swaps the whole `Arc`,
//! so a search that already cloned the old one keeps a consistent pair.

use crate::index::IndexError;
use crate::index::VectorIndex;
use crate::types::MetadataRecord;
use crate::types::SearchResult;
use dashmap::DashMap;
use dashmap::DashSet;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// A vector index joined with its metadata records.
pub struct LoadedIndex {
    index: Box<dyn VectorIndex>,
    metadata: Vec<MetadataRecord>,
    build_id: Uuid,
}

impl LoadedIndex {
    /// Pair an index with metadata; record `i` must describe vector `i`.
    pub fn new(
        index: Box<dyn VectorIndex>,
        metadata: Vec<MetadataRecord>,
        build_id: Uuid,
    ) -> Result<Self, IndexError> {
        if index.len() != metadata.len() {
            return Err(IndexError::MetadataMismatch {
                vectors: index.len(),
                records: metadata.len(),
            });
        }
        Ok(Self {
            index,
            metadata,
            build_id,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub const fn build_id(&self) -> Uuid {
        self.build_id
    }

    pub fn metadata(&self) -> &[MetadataRecord] {
        &self.metadata
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    /// Top-`k` hits for a normalized query, tagged with `corpus`.
    ///
    /// Positions without a metadata record are dropped.
    pub fn search(
        &self,
        corpus: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(usize, SearchResult)>, IndexError> {
        let hits = self.index.search(query, k)?;
        let mut results = Vec::with_capacity(hits.len());
        for (score, position) in hits {
            match self.metadata.get(position) {
                Some(record) => results.push((
                    position,
                    SearchResult {
                        corpus: corpus.to_string(),
                        score,
                        record: record.clone(),
                    },
                )),
                None => warn!(
                    "Index {} returned position {} beyond its {} metadata records",
                    corpus,
                    position,
                    self.metadata.len()
                ),
            }
        }
        Ok(results)
    }
}

impl fmt::Debug for LoadedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedIndex")
            .field("vectors", &self.index.len())
            .field("dimensions", &self.index.dimensions())
            .field("build_id", &self.build_id)
            .finish()
    }
}

/// Corpus name to loaded index, plus the set of corpus names worth searching.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    indexes: DashMap<String, Arc<LoadedIndex>>,
    known: DashSet<String>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<LoadedIndex>> {
        self.indexes.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Install `index` under `name`, returning the previous one.
    pub fn insert(&self, name: &str, index: LoadedIndex) -> Option<Arc<LoadedIndex>> {
        self.known.insert(name.to_string());
        self.indexes.insert(name.to_string(), Arc::new(index))
    }

    /// Drop the loaded index; the name stays known so it can be reloaded.
    pub fn remove(&self, name: &str) -> bool {
        self.indexes.remove(name).is_some()
    }

    /// Mark `name` as a search candidate. Returns false if already known.
    pub fn register(&self, name: &str) -> bool {
        self.known.insert(name.to_string())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    pub fn loaded_count(&self) -> usize {
        self.indexes.len()
    }

    /// Every known or loaded corpus name, sorted.
    pub fn known(&self) -> Vec<String> {
        let mut names: Vec<String> = self.known.iter().map(|name| name.key().clone()).collect();
        for entry in self.indexes.iter() {
            if !self.known.contains(entry.key()) {
                names.push(entry.key().clone());
            }
        }
        names.sort();
        names.dedup();
        names
    }
}
