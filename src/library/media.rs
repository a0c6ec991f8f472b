//! The media storage area: a flat directory of downloaded files.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

/// Errors from media file handling
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid media file name: {0:?}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Directory holding media files, addressed by bare file name
#[derive(Debug, Clone)]
pub struct MediaStorage {
    dir: PathBuf,
}

impl MediaStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Base directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure the storage directory exists
    pub async fn ensure_dir(&self) -> Result<(), MediaError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Resolve a file name to its path, refusing anything outside the directory
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, MediaError> {
        let invalid = filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains('\0');

        if invalid {
            return Err(MediaError::InvalidFilename(filename.to_string()));
        }

        Ok(self.dir.join(filename))
    }

    /// Check whether a media file is present
    pub async fn exists(&self, filename: &str) -> bool {
        match self.path_for(filename) {
            Ok(path) => fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Delete a media file. Returns `Ok(false)` if it was already gone.
    pub async fn remove(&self, filename: &str) -> Result<bool, MediaError> {
        let path = self.path_for(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
