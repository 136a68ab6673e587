//! Local cache: named blobs on the filesystem
//!
//! The local cache is a synchronous key-to-blob primitive, one blob per
//! logical store. Writes are atomic (write to temp file, fsync, rename)
//! so a blob is never left half-written.
//!
//! Schema versions are embedded in the blob name (`quiz_results_v2`);
//! changing a record's shape bumps the key and orphans the old blob
//! rather than migrating it.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::{StorageError, StorageResult};

/// Synchronous key-to-blob persistence
///
/// Feature stores hold this as a trait object so tests and alternative
/// platforms can substitute their own primitive.
pub trait LocalCache: Send + Sync {
    /// Read a blob, `None` when absent or unreadable
    fn read(&self, key: &str) -> Option<Vec<u8>>;

    /// Write a blob, replacing any previous value
    fn write(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Remove a blob; removing an absent blob is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// File-backed cache, one file per blob under a data directory
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalCache for FileCache {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.blob_path(key);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                // Unreadable degrades to absent, never an error upward
                warn!(key, error = %e, "cache blob unreadable, treating as absent");
                None
            }
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        atomic_write(&self.blob_path(key), bytes)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.blob_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|e| StorageError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_absent_blob() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        assert!(cache.read("bookmarks").is_none());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        cache.write("notes", b"[1,2,3]").unwrap();
        assert_eq!(cache.read("notes").unwrap(), b"[1,2,3]");
    }

    #[test]
    fn test_write_replaces_previous_blob() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        cache.write("scores", b"old").unwrap();
        cache.write("scores", b"new").unwrap();
        assert_eq!(cache.read("scores").unwrap(), b"new");
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        cache.write("progress", b"{}").unwrap();
        cache.remove("progress").unwrap();
        assert!(cache.read("progress").is_none());

        // Removing again is not an error
        cache.remove("progress").unwrap();
    }

    #[test]
    fn test_keys_are_independent_blobs() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path());

        cache.write("quiz_results_v2", b"quiz").unwrap();
        cache.write("memory_attempts_v2", b"memory").unwrap();

        assert_eq!(cache.read("quiz_results_v2").unwrap(), b"quiz");
        assert_eq!(cache.read("memory_attempts_v2").unwrap(), b"memory");
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let cache = FileCache::new(&nested);

        cache.write("bookmarks", b"[]").unwrap();
        assert!(nested.join("bookmarks.json").exists());
    }
}
