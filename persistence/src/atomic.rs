//! Whole-file replacement helpers.
//!
//! Writers never touch the destination in place: bytes go to a temporary file
//! in the same directory, are synced, and are renamed over the target. Readers
//! therefore see either the previous version or the new one.

use crate::error::PersistenceError;
use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically replace `path` with `bytes`, creating parent directories.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| PersistenceError::Io(e.error))?;
    Ok(())
}

/// Read a whole file, mapping "does not exist" to `None`.
pub fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Remove a file if present. Returns whether something was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("legal.json");

        write_atomic(&path, b"{}").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_write_replaces_previous_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("medical.json");

        write_atomic(&path, b"first version, rather long").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(read_if_exists(&path).unwrap().as_deref(), Some(&b"second"[..]));
        // No temp files are left behind next to the target.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        assert!(read_if_exists(&dir.path().join("nope")).unwrap().is_none());
        assert!(!remove_if_exists(&dir.path().join("nope")).unwrap());
    }
}
