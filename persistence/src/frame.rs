//! Framed artifact encoding.
//!
//! Every persisted artifact is a single frame:
//!
//! ```text
//! magic "PLXA" | u16 version | u8 kind | 16-byte build id
//!   | u32 raw len | u32 compressed len | zstd(payload)
//! ```
//!
//! The build id ties together artifacts written by one build, so a reader can
//! refuse a pair that was only half replaced.

use crate::FORMAT_VERSION;
use crate::PLXA_MAGIC;
use crate::compression;
use crate::compression::CompressionLevel;
use crate::error::PersistenceError;
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use uuid::Uuid;

/// What a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ArtifactKind {
    /// Opaque vector index blob
    VectorIndex = 1,
    /// Metadata record array
    Metadata = 2,
}

impl ArtifactKind {
    const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::VectorIndex),
            2 => Some(Self::Metadata),
            _ => None,
        }
    }
}

/// Header fields of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub kind: ArtifactKind,
    pub build_id: Uuid,
}

/// Bytes before the compressed payload.
const HEADER_LEN: usize = 4 + 2 + 1 + 16 + 4 + 4;

/// Encodes and decodes artifact frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactCodec {
    level: CompressionLevel,
}

impl ArtifactCodec {
    pub const fn new(level: CompressionLevel) -> Self {
        Self { level }
    }

    /// Wrap raw payload bytes in a frame.
    pub fn encode(&self, header: FrameHeader, payload: &[u8]) -> Result<Vec<u8>> {
        let compressed = compression::compress(payload, self.level)?;
        let raw_len = frame_len(payload.len())?;
        let len = frame_len(compressed.len())?;

        tracing::debug!(
            kind = ?header.kind,
            raw = payload.len(),
            compressed = compressed.len(),
            "encoded artifact frame"
        );

        let mut out = Vec::with_capacity(compressed.len() + HEADER_LEN);
        out.write_all(PLXA_MAGIC)?;
        out.write_all(&FORMAT_VERSION.to_le_bytes())?;
        out.write_all(&[header.kind as u8])?;
        out.write_all(header.build_id.as_bytes())?;
        out.write_all(&raw_len.to_le_bytes())?;
        out.write_all(&len.to_le_bytes())?;
        out.write_all(&compressed)?;
        Ok(out)
    }

    /// Read only the header of a frame, validating magic, version and kind.
    pub fn read_header(&self, bytes: &[u8], expected: ArtifactKind) -> Result<FrameHeader> {
        let mut reader = Cursor::new(bytes);
        read_header(&mut reader, expected)
    }

    /// Unwrap a frame, returning its header and decompressed payload.
    pub fn decode(&self, bytes: &[u8], expected: ArtifactKind) -> Result<(FrameHeader, Vec<u8>)> {
        let mut reader = Cursor::new(bytes);
        let header = read_header(&mut reader, expected)?;
        let raw_len = read_u32(&mut reader)? as usize;
        let len = read_u32(&mut reader)? as usize;

        let start = reader.position() as usize;
        let remaining = bytes.len() - start;
        if remaining != len {
            return Err(PersistenceError::CorruptData(format!(
                "frame declares {len} payload bytes but {remaining} are present"
            )));
        }

        let payload = compression::decompress(&bytes[start..], raw_len)?;
        Ok((header, payload))
    }

    /// Serialize a value with bincode and frame it.
    pub fn encode_value<T: Serialize>(&self, header: FrameHeader, value: &T) -> Result<Vec<u8>> {
        let payload = bincode::serde::encode_to_vec(value, bincode::config::standard())?;
        self.encode(header, &payload)
    }

    /// Decode a frame and deserialize its bincode payload.
    pub fn decode_value<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        expected: ArtifactKind,
    ) -> Result<(FrameHeader, T)> {
        let (header, payload) = self.decode(bytes, expected)?;
        let (value, _) = bincode::serde::decode_from_slice(&payload, bincode::config::standard())?;
        Ok((header, value))
    }
}

fn read_header(reader: &mut Cursor<&[u8]>, expected: ArtifactKind) -> Result<FrameHeader> {
    let mut magic = [0u8; 4];
    read_exact(reader, &mut magic)?;
    if magic != PLXA_MAGIC {
        return Err(PersistenceError::InvalidMagic);
    }

    let mut version_bytes = [0u8; 2];
    read_exact(reader, &mut version_bytes)?;
    let version = u16::from_le_bytes(version_bytes);
    if version != FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(version, FORMAT_VERSION));
    }

    let mut kind_byte = [0u8; 1];
    read_exact(reader, &mut kind_byte)?;
    let kind = ArtifactKind::from_byte(kind_byte[0]).ok_or(PersistenceError::InvalidKind {
        expected: expected as u8,
        found: kind_byte[0],
    })?;
    if kind != expected {
        return Err(PersistenceError::InvalidKind {
            expected: expected as u8,
            found: kind as u8,
        });
    }

    let mut id_bytes = [0u8; 16];
    read_exact(reader, &mut id_bytes)?;

    Ok(FrameHeader {
        kind,
        build_id: Uuid::from_bytes(id_bytes),
    })
}

fn frame_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        PersistenceError::CorruptData(format!("payload of {len} bytes exceeds frame limit"))
    })
}

fn read_u32(reader: &mut Cursor<&[u8]>) -> Result<u32> {
    let mut bytes = [0u8; 4];
    read_exact(reader, &mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

/// A short read inside an in-memory frame is truncation, not an I/O failure.
fn read_exact(reader: &mut Cursor<&[u8]>, buf: &mut [u8]) -> Result<()> {
    reader
        .read_exact(buf)
        .map_err(|_| PersistenceError::CorruptData("truncated frame".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(kind: ArtifactKind) -> FrameHeader {
        FrameHeader {
            kind,
            build_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_frame_roundtrip_preserves_header() {
        let codec = ArtifactCodec::new(CompressionLevel::Fast);
        let header = header(ArtifactKind::VectorIndex);
        let payload = vec![7u8; 512];

        let bytes = codec.encode(header, &payload).unwrap();
        let (decoded, body) = codec.decode(&bytes, ArtifactKind::VectorIndex).unwrap();

        assert_eq!(decoded, header);
        assert_eq!(body, payload);
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let codec = ArtifactCodec::default();
        let bytes = codec.encode(header(ArtifactKind::Metadata), b"records").unwrap();

        let err = codec.decode(&bytes, ArtifactKind::VectorIndex).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::InvalidKind {
                expected: 1,
                found: 2
            }
        ));
        assert!(err.is_corruption());
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let codec = ArtifactCodec::default();
        let mut bytes = codec.encode(header(ArtifactKind::Metadata), b"x").unwrap();
        bytes[0] = b'Z';

        assert!(matches!(
            codec.decode(&bytes, ArtifactKind::Metadata),
            Err(PersistenceError::InvalidMagic)
        ));
    }

    #[test]
    fn test_truncated_frame_is_corrupt() {
        let codec = ArtifactCodec::default();
        let bytes = codec
            .encode(header(ArtifactKind::Metadata), &[1u8; 128])
            .unwrap();

        let err = codec
            .decode(&bytes[..bytes.len() - 3], ArtifactKind::Metadata)
            .unwrap_err();
        assert!(matches!(err, PersistenceError::CorruptData(_)));

        let err = codec.decode(&bytes[..5], ArtifactKind::Metadata).unwrap_err();
        assert!(matches!(err, PersistenceError::CorruptData(_)));
    }

    #[test]
    fn test_tampered_raw_length_is_corrupt() {
        let codec = ArtifactCodec::default();
        let mut bytes = codec
            .encode(header(ArtifactKind::VectorIndex), &[9u8; 256])
            .unwrap();
        // Raw length sits right after the build id.
        bytes[23..27].copy_from_slice(&1_000_000u32.to_le_bytes());

        let err = codec.decode(&bytes, ArtifactKind::VectorIndex).unwrap_err();
        assert!(matches!(err, PersistenceError::CorruptData(_)));
        assert!(err.is_corruption());
    }

    #[test]
    fn test_value_roundtrip() {
        let codec = ArtifactCodec::default();
        let value = vec![("legal".to_string(), 3usize), ("medical".to_string(), 0)];
        let header = header(ArtifactKind::Metadata);

        let bytes = codec.encode_value(header, &value).unwrap();
        let (decoded_header, decoded): (FrameHeader, Vec<(String, usize)>) =
            codec.decode_value(&bytes, ArtifactKind::Metadata).unwrap();

        assert_eq!(decoded_header.build_id, header.build_id);
        assert_eq!(decoded, value);
    }
}
