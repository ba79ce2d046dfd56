//! Artifact persistence for Polyglot.
//!
//! This crate owns the on-disk representation of derived retrieval artifacts:
//! framed, zstd-compressed blobs with a build id header, and the atomic file
//! replacement used for both artifacts and corpus files.

pub mod atomic;
pub mod compression;
pub mod error;
pub mod frame;

#[cfg(test)]
mod tests;

pub use atomic::read_if_exists;
pub use atomic::remove_if_exists;
pub use atomic::write_atomic;
pub use compression::CompressionLevel;
pub use error::PersistenceError;
pub use error::Result;
pub use frame::ArtifactCodec;
pub use frame::ArtifactKind;
pub use frame::FrameHeader;

/// Magic bytes at the start of every artifact frame
pub const PLXA_MAGIC: &[u8] = b"PLXA";

/// Current artifact format version
pub const FORMAT_VERSION: u16 = 1;
