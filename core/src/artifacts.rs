//! On-disk index artifacts.
//!
//! Every built corpus leaves two framed files next to its corpus JSON:
//! `<name>_index.plx` (vector index blob) and `<name>_metadata.plx`
//! (metadata records). Both frames carry the same build id. Metadata is
//! written first and the index last, so a crash between the two leaves
//! either the previous pair or a torn pair whose ids disagree; torn and
//! unreadable pairs are reported as absent.

use crate::error::Result;
use crate::index::FlatIpIndex;
use crate::index::VectorIndex;
use crate::registry::LoadedIndex;
use crate::types::MetadataRecord;
use polyglot_persistence::ArtifactCodec;
use polyglot_persistence::ArtifactKind;
use polyglot_persistence::CompressionLevel;
use polyglot_persistence::FrameHeader;
use polyglot_persistence::PersistenceError;
use polyglot_persistence::read_if_exists;
use polyglot_persistence::remove_if_exists;
use polyglot_persistence::write_atomic;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

const INDEX_SUFFIX: &str = "_index.plx";
const METADATA_SUFFIX: &str = "_metadata.plx";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    codec: ArtifactCodec,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, compression: CompressionLevel) -> Self {
        Self {
            dir: dir.into(),
            codec: ArtifactCodec::new(compression),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{INDEX_SUFFIX}"))
    }

    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{METADATA_SUFFIX}"))
    }

    /// True when both files of the pair are present (not necessarily valid).
    pub fn exists(&self, name: &str) -> bool {
        self.index_path(name).is_file() && self.metadata_path(name).is_file()
    }

    /// Persist a pair under a fresh build id and return that id.
    pub fn save(
        &self,
        name: &str,
        index: &dyn VectorIndex,
        metadata: &[MetadataRecord],
    ) -> Result<Uuid> {
        fs::create_dir_all(&self.dir)?;
        let build_id = Uuid::new_v4();

        let metadata_frame = self.codec.encode_value(
            FrameHeader {
                kind: ArtifactKind::Metadata,
                build_id,
            },
            &metadata,
        )?;
        let index_frame = self.codec.encode(
            FrameHeader {
                kind: ArtifactKind::VectorIndex,
                build_id,
            },
            &index.to_bytes()?,
        )?;

        write_atomic(&self.metadata_path(name), &metadata_frame)?;
        write_atomic(&self.index_path(name), &index_frame)?;

        info!(
            "Saved index for {} ({} vectors, build {})",
            name,
            metadata.len(),
            build_id
        );
        Ok(build_id)
    }

    /// Load a pair. Missing, torn or corrupt pairs yield `None`; only I/O
    /// failures other than absence are errors.
    pub fn load(&self, name: &str) -> Result<Option<LoadedIndex>> {
        let Some(metadata_bytes) = read_if_exists(&self.metadata_path(name))? else {
            debug!("No metadata artifact for {}", name);
            return Ok(None);
        };
        let Some(index_bytes) = read_if_exists(&self.index_path(name))? else {
            debug!("No index artifact for {}", name);
            return Ok(None);
        };

        match self.decode_pair(&metadata_bytes, &index_bytes) {
            Ok(Some(loaded)) => {
                debug!(
                    "Loaded index for {} ({} vectors, build {})",
                    name,
                    loaded.len(),
                    loaded.build_id()
                );
                Ok(Some(loaded))
            }
            Ok(None) => {
                warn!("Ignoring torn index artifacts for {}: build ids differ", name);
                Ok(None)
            }
            Err(PairError::Persistence(e)) if !e.is_corruption() => Err(e.into()),
            Err(e) => {
                warn!("Ignoring unreadable index artifacts for {}: {}", name, e);
                Ok(None)
            }
        }
    }

    fn decode_pair(
        &self,
        metadata_bytes: &[u8],
        index_bytes: &[u8],
    ) -> std::result::Result<Option<LoadedIndex>, PairError> {
        // Compare headers before paying for decompression.
        let metadata_header = self
            .codec
            .read_header(metadata_bytes, ArtifactKind::Metadata)?;
        let index_header = self
            .codec
            .read_header(index_bytes, ArtifactKind::VectorIndex)?;
        if metadata_header.build_id != index_header.build_id {
            return Ok(None);
        }

        let (_, metadata): (_, Vec<MetadataRecord>) = self
            .codec
            .decode_value(metadata_bytes, ArtifactKind::Metadata)?;
        let (_, blob) = self.codec.decode(index_bytes, ArtifactKind::VectorIndex)?;
        let index = FlatIpIndex::from_bytes(&blob)?;

        let loaded = LoadedIndex::new(Box::new(index), metadata, index_header.build_id)?;
        Ok(Some(loaded))
    }

    /// Delete both files of a pair. Returns true if anything was removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let index = remove_if_exists(&self.index_path(name))?;
        let metadata = remove_if_exists(&self.metadata_path(name))?;
        Ok(index || metadata)
    }

    /// Corpus names with an index file in the directory, sorted.
    pub fn discover(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let file_name = entry?.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            match file_name.strip_suffix(INDEX_SUFFIX) {
                Some(name) if crate::corpus::validate_name(name).is_ok() => {
                    names.push(name.to_string())
                }
                _ => {}
            }
        }
        names.sort();
        Ok(names)
    }
}

#[derive(Debug, thiserror::Error)]
enum PairError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Index(#[from] crate::index::IndexError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Entry;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store() -> (TempDir, ArtifactStore) {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path(), CompressionLevel::Fast);
        (dir, store)
    }

    fn pair(texts: &[&str]) -> (FlatIpIndex, Vec<MetadataRecord>) {
        let mut index = FlatIpIndex::new(2).unwrap();
        let mut metadata = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            index.add(&[vec![1.0, i as f32]]).unwrap();
            metadata.push(MetadataRecord {
                corpus: "medical".to_string(),
                position: i,
                translations: Entry::from_pairs([("en", *text), ("es", "x")]),
            });
        }
        (index, metadata)
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = store();
        let (index, metadata) = pair(&["Blood pressure", "Heart rate"]);
        let build_id = store.save("medical", &index, &metadata).unwrap();

        let loaded = store.load("medical").unwrap().unwrap();
        assert_eq!(loaded.build_id(), build_id);
        assert_eq!(loaded.metadata(), metadata.as_slice());
        assert_eq!(loaded.dimensions(), 2);
        assert!(store.exists("medical"));
    }

    #[test]
    fn test_missing_pair_is_absent() {
        let (_dir, store) = store();
        assert!(store.load("legal").unwrap().is_none());
        assert!(!store.exists("legal"));
    }

    #[test]
    fn test_torn_pair_is_absent() {
        let (_dir, store) = store();
        let (index, metadata) = pair(&["a"]);
        store.save("medical", &index, &metadata).unwrap();
        let old_index = fs::read(store.index_path("medical")).unwrap();

        let (index, metadata) = pair(&["a", "b"]);
        store.save("medical", &index, &metadata).unwrap();
        // Simulate a crash after the metadata write of the second build.
        fs::write(store.index_path("medical"), old_index).unwrap();

        assert!(store.load("medical").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_absent() {
        let (_dir, store) = store();
        let (index, metadata) = pair(&["a"]);
        store.save("medical", &index, &metadata).unwrap();
        fs::write(store.index_path("medical"), b"not a frame").unwrap();

        assert!(store.load("medical").unwrap().is_none());
    }

    #[test]
    fn test_discover_and_remove() {
        let (dir, store) = store();
        let (index, metadata) = pair(&["a"]);
        store.save("medical", &index, &metadata).unwrap();
        store.save("legal", &index, &metadata).unwrap();
        fs::write(dir.path().join("legal.json"), "{}").unwrap();

        assert_eq!(
            store.discover().unwrap(),
            vec!["legal".to_string(), "medical".to_string()]
        );
        assert!(store.remove("legal").unwrap());
        assert!(!store.remove("legal").unwrap());
        assert_eq!(store.discover().unwrap(), vec!["medical".to_string()]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("nope"), CompressionLevel::Fast);
        assert!(store.discover().unwrap().is_empty());
    }
}
