use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Filesystem access used by a migration run.
///
/// Writes are not transactional: a failure partway through leaves earlier
/// writes in place.
pub trait Storage {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &str) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}

/// Reads and writes the real filesystem.
pub struct FileStorage;

impl Default for FileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FileStorage {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))
    }
}

/// Reads through to disk but keeps every write in memory.
///
/// Pending writes shadow the file on disk, so a dry run sees the same
/// content a real run would.
#[derive(Default)]
pub struct DryRunStorage {
    pending: RefCell<BTreeMap<PathBuf, String>>,
}

impl DryRunStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes recorded so far, keyed by path.
    pub fn pending_writes(&self) -> BTreeMap<PathBuf, String> {
        self.pending.borrow().clone()
    }
}

impl Storage for DryRunStorage {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        if let Some(contents) = self.pending.borrow().get(path) {
            return Ok(contents.clone());
        }
        FileStorage.read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        info!(path = %path.display(), bytes = contents.len(), "dry run: skipping write");
        self.pending
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "dry run: skipping directory creation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stylesplit_{name}_{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = scratch_dir("storage");
        let storage = FileStorage::new();
        storage.create_dir_all(&dir.join("nested")).unwrap();

        let path = dir.join("nested/out.css");
        storage.write(&path, "a {\nb\n}\n").unwrap();
        assert_eq!(storage.read_to_string(&path).unwrap(), "a {\nb\n}\n");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let path = scratch_dir("missing").join("App.css");
        let err = FileStorage::new().read_to_string(&path).unwrap_err();
        assert!(format!("{err:#}").contains("App.css"));
    }

    #[test]
    fn test_dry_run_never_touches_disk() {
        let dir = scratch_dir("dry_run");
        let storage = DryRunStorage::new();
        storage.create_dir_all(&dir).unwrap();
        storage.write(&dir.join("globals.css"), "\n").unwrap();

        assert!(!dir.exists());
        assert_eq!(storage.read_to_string(&dir.join("globals.css")).unwrap(), "\n");
        assert_eq!(storage.pending_writes().len(), 1);
    }
}
