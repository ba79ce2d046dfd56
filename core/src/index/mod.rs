//! Vector indexes.
//!
//! An index stores unit-length vectors in insertion order and answers
//! top-k inner-product queries. Position `i` in the index is the join key
//! with metadata record `i`.

mod flat;

pub use flat::FlatIpIndex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index must have at least one dimension")]
    ZeroDimensions,

    #[error("Index has {vectors} vectors but {records} metadata records")]
    MetadataMismatch { vectors: usize, records: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

/// Exact or approximate nearest-neighbour search over inner product.
pub trait VectorIndex: Send + Sync {
    /// Append vectors; positions continue from the current length.
    fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()>;

    /// Up to `k` `(score, position)` pairs, best first.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dimensions(&self) -> usize;

    /// Opaque blob that `from_bytes` of the same implementation accepts.
    fn to_bytes(&self) -> Result<Vec<u8>>;
}
