//! Multi-corpus semantic phrase retrieval.
//!
//! Each translation domain has its own corpus of multilingual phrase entries
//! and its own vector index over the source-language text. A
//! [`RetrievalEngine`] searches one or all of them for the entries closest to
//! a query and can render the best hits as a few-shot example block for a
//! translation prompt.

pub mod artifacts;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod context;
pub mod corpus;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod index;
pub mod language;
pub mod registry;
pub mod types;

pub use builder::BuildOutcome;
pub use catalog::Catalog;
pub use catalog::CorpusSource;
pub use catalog::CorpusStats;
pub use config::PolyglotConfig;
pub use context::ContextAssembler;
pub use corpus::Corpus;
pub use corpus::CorpusStore;
pub use corpus::Entry;
pub use embeddings::EmbeddingProvider;
pub use engine::DomainMatch;
pub use engine::InitReport;
pub use engine::RetrievalEngine;
pub use error::RetrievalError;
pub use error::Result;
pub use language::Domain;
pub use language::Language;
pub use types::MetadataRecord;
pub use types::SearchResult;
