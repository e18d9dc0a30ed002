//! Score Storage Backends
//!
//! Raw byte access to the persisted score document. The store always
//! loads and saves the whole document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

/// Storage-level failures. A missing file is not a failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading the document failed.
    #[error("failed to read {location}: {source}")]
    Read {
        /// Where the document lives.
        location: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing the document failed.
    #[error("failed to write {location}: {source}")]
    Write {
        /// Where the document lives.
        location: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Whole-document persistence.
pub trait ScoreStorage: Send + Sync {
    /// Load the stored bytes, or `None` if nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the stored bytes.
    fn save(&self, bytes: &[u8]) -> Result<(), StorageError>;

    /// Human-readable location for logs and errors.
    fn location(&self) -> String;
}

// =============================================================================
// JSON FILE
// =============================================================================

/// A single file on disk.
///
/// Saves go through a sibling temporary file and a rename, so a crash
/// mid-write leaves either the old or the new document.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage at `path`. Nothing is touched until the first load/save.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: io::Error) -> StorageError {
        StorageError::Write {
            location: self.location(),
            source,
        }
    }
}

impl ScoreStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                debug!("Read {} bytes from {}", bytes.len(), self.path.display());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                location: self.location(),
                source,
            }),
        }
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, bytes).map_err(|e| self.write_error(e))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(self.write_error(e));
        }

        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// =============================================================================
// IN MEMORY
// =============================================================================

/// Process-local storage, mainly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    bytes: Mutex<Option<Vec<u8>>>,
    saves: Mutex<usize>,
}

impl MemoryStorage {
    /// Empty storage (behaves like a missing file).
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `text`.
    pub fn with_contents(text: &str) -> Self {
        Self {
            bytes: Mutex::new(Some(text.as_bytes().to_vec())),
            saves: Mutex::new(0),
        }
    }

    /// Current contents as text, if any.
    pub fn contents(&self) -> Option<String> {
        let guard = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ScoreStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.bytes.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StorageError> {
        *self.bytes.lock().unwrap_or_else(|e| e.into_inner()) = Some(bytes.to_vec());
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("arcade-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = scratch_dir();
        let storage = JsonFileStorage::new(dir.join("global_scores.json"));

        assert!(storage.load().unwrap().is_none());
        assert!(!dir.exists());
    }

    #[test]
    fn test_save_creates_parent_and_leaves_no_temp_file() {
        let dir = scratch_dir();
        let path = dir.join("data").join("global_scores.json");
        let storage = JsonFileStorage::new(&path);

        storage.save(b"{}").unwrap();

        assert_eq!(storage.load().unwrap().unwrap(), b"{}");
        assert!(!path.with_file_name("global_scores.json.tmp").exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let dir = scratch_dir();
        let storage = JsonFileStorage::new(dir.join("scores.json"));

        storage.save(b"{\"A\": []}").unwrap();
        storage.save(b"{}").unwrap();

        assert_eq!(storage.load().unwrap().unwrap(), b"{}");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_directory_in_place_of_file_is_read_error() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).unwrap();
        let storage = JsonFileStorage::new(&dir);

        assert!(matches!(storage.load(), Err(StorageError::Read { .. })));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_memory_storage_counts_saves() {
        let storage = MemoryStorage::with_contents("{}");
        assert_eq!(storage.contents().as_deref(), Some("{}"));
        assert_eq!(storage.save_count(), 0);

        storage.save(b"[]").unwrap();

        assert_eq!(storage.contents().as_deref(), Some("[]"));
        assert_eq!(storage.save_count(), 1);
    }
}
