//! Error types for persistence operations

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PersistenceError>;

#[derive(Error, Debug)]
pub enum PersistenceError {
    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bincode encoding errors
    #[error("Bincode encoding error: {0}")]
    BincodeEncode(#[from] bincode::error::EncodeError),

    /// Bincode decoding errors
    #[error("Bincode decoding error: {0}")]
    BincodeDecode(#[from] bincode::error::DecodeError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Compression errors
    #[error("Compression error: {0}")]
    Compression(String),

    /// Invalid magic bytes in file header
    #[error("Invalid file format: expected PLXA magic bytes")]
    InvalidMagic,

    /// Unsupported format version
    #[error("Unsupported format version: {0} (expected {1})")]
    UnsupportedVersion(u16, u16),

    /// Frame holds a different artifact than the caller asked for
    #[error("Unexpected artifact kind: expected {expected}, found {found}")]
    InvalidKind { expected: u8, found: u8 },

    /// Corrupt artifact data
    #[error("Corrupt artifact data: {0}")]
    CorruptData(String),
}

impl PersistenceError {
    /// Whether the error means the bytes on disk are unusable (as opposed to
    /// the disk itself failing).
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::BincodeDecode(_)
                | Self::Compression(_)
                | Self::InvalidMagic
                | Self::UnsupportedVersion(..)
                | Self::InvalidKind { .. }
                | Self::CorruptData(_)
        )
    }
}
