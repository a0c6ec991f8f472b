//! Whole-file JSON persistence.
//!
//! Collections are small and rewritten in full on every mutation. Writes go
//! to a temp file in the target's directory which is fsynced and then
//! renamed over the target, so readers only ever see the old or the new
//! document.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors from the JSON file layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Data directory is in use by another process: {0}")]
    Locked(PathBuf),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a JSON document, returning `None` if the file does not exist
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StoreError::json(path, e))
}

/// Replace a JSON document atomically (write temp, fsync, rename)
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let content = serde_json::to_string_pretty(value).map_err(|e| StoreError::json(path, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    let tmp_path = tmp.path().to_path_buf();
    tmp.write_all(content.as_bytes())
        .map_err(|e| StoreError::io(&tmp_path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(&tmp_path, e))?;

    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    Ok(())
}

/// Exclusive advisory lock on a data directory, released on drop
#[derive(Debug)]
pub struct DirLock {
    _file: File,
    path: PathBuf,
}

impl DirLock {
    /// Take the lock on `<dir>/.lock`, failing fast if another process holds it
    pub fn acquire(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        let path = dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        file.try_lock_exclusive()
            .map_err(|_| StoreError::Locked(dir.to_path_buf()))?;

        Ok(Self { _file: file, path })
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let loaded: Option<Vec<String>> = load_json(&temp.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_replaces_previous_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("items.json");

        write_json_atomic(&path, &vec!["a", "b"]).unwrap();
        write_json_atomic(&path, &vec!["c"]).unwrap();

        let loaded: Vec<String> = load_json(&path).unwrap().unwrap();
        assert_eq!(loaded, vec!["c".to_string()]);

        // No temp files left next to the target
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<Option<Vec<String>>, _> = load_json(&path);
        assert!(matches!(result, Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_dir_lock_is_exclusive() {
        let temp = TempDir::new().unwrap();

        let first = DirLock::acquire(temp.path()).unwrap();
        assert!(first.path().ends_with(".lock"));

        let second = DirLock::acquire(temp.path());
        assert!(matches!(second, Err(StoreError::Locked(_))));

        drop(first);
        assert!(DirLock::acquire(temp.path()).is_ok());
    }
}
