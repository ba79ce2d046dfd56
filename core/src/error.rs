use crate::corpus::CorpusError;
use crate::embeddings::EmbeddingError;
use crate::index::IndexError;
use polyglot_persistence::PersistenceError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// The embedding provider failed. Searches and builds surface this to the
    /// caller; context assembly degrades to an empty string instead.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("artifact storage error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RetrievalError {
    /// True when the provider, not local state, caused the failure.
    pub const fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Embedding(_))
    }
}
