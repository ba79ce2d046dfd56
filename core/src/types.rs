//! Records shared between the builder, the registry and the engine.

use crate::corpus::Entry;
use crate::language::Language;
use serde::Deserialize;
use serde::Serialize;

/// Metadata stored alongside vector `position` of a corpus index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub corpus: String,
    /// Position of the entry inside the corpus file it was built from.
    pub position: usize,
    pub translations: Entry,
}

impl MetadataRecord {
    pub fn translation(&self, language: &Language) -> Option<&str> {
        self.translations.get(language)
    }
}

/// One ranked hit. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub corpus: String,
    /// Cosine similarity of the query and the entry's source text.
    pub score: f32,
    pub record: MetadataRecord,
}
