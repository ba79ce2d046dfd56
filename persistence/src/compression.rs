//! zstd payload coding for artifact frames.
//!
//! Frames record both the raw and the compressed payload length. Decoding
//! never allocates more than the declared raw length, and a payload that
//! expands to any other size is rejected as corrupt.

use crate::error::PersistenceError;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;

/// zstd effort used when writing artifacts. Reading accepts any level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// zstd level 1
    Fast,
    /// zstd level 3
    #[default]
    Balanced,
    /// zstd level 9
    Maximum,
    /// Any zstd level, clamped to 1..=22
    Custom(i32),
}

impl CompressionLevel {
    pub fn to_level(self) -> i32 {
        match self {
            Self::Fast => 1,
            Self::Balanced => 3,
            Self::Maximum => 9,
            Self::Custom(level) => level.clamp(1, 22),
        }
    }
}

pub(crate) fn compress(payload: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    zstd::bulk::compress(payload, level.to_level())
        .map_err(|e| PersistenceError::Compression(e.to_string()))
}

/// Expand `compressed`, which must hold exactly `raw_len` bytes of payload.
pub(crate) fn decompress(compressed: &[u8], raw_len: usize) -> Result<Vec<u8>> {
    let payload = zstd::bulk::decompress(compressed, raw_len)
        .map_err(|e| PersistenceError::Compression(e.to_string()))?;
    if payload.len() != raw_len {
        return Err(PersistenceError::CorruptData(format!(
            "payload expands to {} bytes, frame declares {raw_len}",
            payload.len()
        )));
    }
    Ok(payload)
}
