//! Document collection persistence
//!
//! The whole collection is serialized as one JSON sequence on every save
//! (overwrite, not incremental) and deserialized once at startup. Atomic
//! writes (write to temp file, then rename) prevent partial-write
//! corruption across documents within one save.
//!
//! This is O(total documents) work per single-document mutation — fine for
//! the intended scale of low hundreds of documents, well under a few
//! megabytes of serialized data.
//!
//! Storage location: `<data_dir>/documents.json` (configurable via `Config`).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::document::Document;
use crate::storage::error::{StorageError, StorageResult};

/// Persistence layer for the document collection
///
/// Provides atomic file operations for saving/loading the collection.
pub struct CollectionPersistence {
    config: Config,
}

impl CollectionPersistence {
    /// Create a new persistence handler with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if a collection exists on disk
    pub fn exists(&self) -> bool {
        self.config.documents_path().exists()
    }

    /// Save the collection to disk using atomic write
    ///
    /// Writes to a temporary file first, then renames it to the target
    /// path, so the file is never left in a partially-written state.
    pub fn save(&self, documents: &[Document]) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(documents)?;
        atomic_write(&self.config.documents_path(), &bytes)
    }

    /// Load the collection from disk
    ///
    /// Returns `None` if no collection file exists yet. When the file
    /// exists but cannot be decoded, it is moved aside to a
    /// `.corrupt.backup` sibling and a `CorruptCollection` error is
    /// returned; the original data stays recoverable by hand.
    pub fn load(&self) -> StorageResult<Option<Vec<Document>>> {
        let path = self.config.documents_path();

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|e| StorageError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        match serde_json::from_slice(&bytes) {
            Ok(documents) => Ok(Some(documents)),
            Err(e) => {
                let backup_path = backup_corrupt_file(&path);
                Err(StorageError::CorruptCollection {
                    path,
                    backup_path,
                    details: e.to_string(),
                })
            }
        }
    }

    /// Delete the stored collection
    pub fn delete(&self) -> StorageResult<()> {
        let path = self.config.documents_path();
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StorageError::from_io(e, path))?;
        }
        Ok(())
    }
}

/// Move an undecodable collection file aside so a fresh collection can be
/// written without destroying the old data
fn backup_corrupt_file(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".corrupt.backup");
    let backup = PathBuf::from(backup);

    if let Err(e) = fs::rename(path, &backup) {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "could not move corrupt collection file aside"
        );
    }
    backup
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    // Create temp file in the same directory (for atomic rename)
    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|e| StorageError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
