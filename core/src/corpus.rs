//! Durable corpus storage.
//!
//! A corpus is one JSON file per name under the store directory:
//!
//! ```json
//! { "name": "medical", "domain": "medical", "languages": ["en", "es"],
//!   "data": [{"en": "Blood pressure", "es": "Presión arterial"}],
//!   "created_at": "2024-05-01T10:00:00Z", "count": 1 }
//! ```
//!
//! Files are replaced atomically, so a reader never sees `count` disagree
//! with the length of `data` unless the file was edited by hand.

use crate::language::Domain;
use crate::language::Language;
use chrono::DateTime;
use chrono::Utc;
use polyglot_persistence::PersistenceError;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use tracing::info;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("invalid corpus name {0:?}: use letters, digits, '_' or '-'")]
    InvalidName(String),

    #[error("corpus {name} declares {declared} entries but holds {actual}")]
    CountMismatch {
        name: String,
        declared: usize,
        actual: usize,
    },

    #[error("corpus JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corpus storage error: {0}")]
    Storage(#[from] PersistenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CorpusError>;

/// One phrase in several languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(BTreeMap<Language, String>);

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an entry from `(code, text)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        pairs
            .into_iter()
            .map(|(code, text)| (Language::from_code(code), text.to_string()))
            .collect()
    }

    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        self.0.insert(language, text.into());
        self
    }

    pub fn insert(&mut self, language: Language, text: impl Into<String>) -> Option<String> {
        self.0.insert(language, text.into())
    }

    pub fn get(&self, language: &Language) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn contains(&self, language: &Language) -> bool {
        self.0.contains_key(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &Language> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Language, &str)> {
        self.0.iter().map(|(lang, text)| (lang, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Language, String)> for Entry {
    fn from_iter<T: IntoIterator<Item = (Language, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A named, domain-tagged collection of entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    pub name: String,
    pub domain: Option<Domain>,
    pub languages: BTreeSet<Language>,
    pub entries: Vec<Entry>,
}

impl Corpus {
    /// Create a corpus whose language set is derived from its entries.
    pub fn new(name: impl Into<String>, domain: Option<Domain>, entries: Vec<Entry>) -> Self {
        let languages = entries
            .iter()
            .flat_map(|entry| entry.languages().cloned())
            .collect();
        Self {
            name: name.into(),
            domain,
            languages,
            entries,
        }
    }
}

/// On-disk layout. Unknown fields are ignored on read.
#[derive(Debug, Serialize, Deserialize)]
struct CorpusFile {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain: Option<Domain>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    languages: BTreeSet<Language>,
    #[serde(default)]
    data: Vec<Entry>,
    created_at: DateTime<Utc>,
    count: usize,
}

/// File-backed corpus store rooted at one directory.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    dir: PathBuf,
}

impl CorpusStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn corpus_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Persist entries under `name`, replacing any prior version.
    pub fn save(&self, name: &str, entries: &[Entry]) -> Result<()> {
        self.write(name, None, &BTreeSet::new(), entries)
    }

    /// Persist a corpus together with its domain tag and language set.
    pub fn save_corpus(&self, corpus: &Corpus) -> Result<()> {
        self.write(
            &corpus.name,
            corpus.domain,
            &corpus.languages,
            &corpus.entries,
        )
    }

    fn write(
        &self,
        name: &str,
        domain: Option<Domain>,
        languages: &BTreeSet<Language>,
        entries: &[Entry],
    ) -> Result<()> {
        validate_name(name)?;
        let file = CorpusFile {
            name: name.to_string(),
            domain,
            languages: languages.clone(),
            data: entries.to_vec(),
            created_at: Utc::now(),
            count: entries.len(),
        };
        let json = serde_json::to_vec_pretty(&file)?;
        polyglot_persistence::write_atomic(&self.corpus_path(name), &json)?;
        debug!(corpus = name, entries = entries.len(), "saved corpus");
        Ok(())
    }

    /// Entries of `name`, or an empty vector when the corpus does not exist.
    pub fn load(&self, name: &str) -> Result<Vec<Entry>> {
        Ok(self
            .load_corpus(name)?
            .map(|corpus| corpus.entries)
            .unwrap_or_default())
    }

    /// The full corpus, or `None` when it does not exist.
    pub fn load_corpus(&self, name: &str) -> Result<Option<Corpus>> {
        validate_name(name)?;
        let Some(bytes) = polyglot_persistence::read_if_exists(&self.corpus_path(name))? else {
            return Ok(None);
        };
        let file: CorpusFile = serde_json::from_slice(&bytes)?;
        if file.count != file.data.len() {
            return Err(CorpusError::CountMismatch {
                name: name.to_string(),
                declared: file.count,
                actual: file.data.len(),
            });
        }

        let languages = if file.languages.is_empty() {
            file.data
                .iter()
                .flat_map(|entry| entry.languages().cloned())
                .collect()
        } else {
            file.languages
        };

        Ok(Some(Corpus {
            name: name.to_string(),
            domain: file.domain,
            languages,
            entries: file.data,
        }))
    }

    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.corpus_path(name).is_file()
    }

    /// Names of all corpora in the store, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) if validate_name(stem).is_ok() => names.push(stem.to_string()),
                _ => {}
            }
        }
        names.sort();
        Ok(names)
    }

    /// Bulk-import a JSON array of entries from `path` as corpus `name`.
    pub fn import(&self, name: &str, path: &Path, domain: Option<Domain>) -> Result<usize> {
        let bytes = fs::read(path)?;
        let entries: Vec<Entry> = serde_json::from_slice(&bytes)?;
        let count = entries.len();
        self.save_corpus(&Corpus::new(name, domain, entries))?;
        info!(corpus = name, entries = count, source = %path.display(), "imported corpus");
        Ok(count)
    }
}

/// Corpus names become file names, so keep them to a safe alphabet.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CorpusError::InvalidName(name.to_string()))
    }
}
