//! Key-value store persisted as one JSON object on disk.

use bevy::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError, entries_size};

/// Store backed by a `{ "key": "value" }` JSON file.
///
/// The file is read once on open and rewritten in full on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>, quota: Option<usize>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self {
            path,
            entries,
            quota,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        // Write to a sibling file first so a failed write never truncates the store
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, String> {
    if !path.exists() {
        info!("No storage file at {:?}, starting empty", path);
        return BTreeMap::new();
    }

    match std::fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Storage file {:?} is corrupted, starting empty: {}", path, e);
                BTreeMap::new()
            }
        },
        Err(e) => {
            warn!("Failed to read storage file {:?}: {}", path, e);
            BTreeMap::new()
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value.to_string());

        if let Some(limit) = self.quota {
            let needed = entries_size(next.iter());
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }

        self.write_entries(&next)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("storage.json"), None);
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut store = FileStore::open(&path, None);
        store.set("drawings", "[]").unwrap();
        store.set("markers", "[{\"id\":1}]").unwrap();

        let reopened = FileStore::open(&path, None);
        assert_eq!(reopened.get("drawings").as_deref(), Some("[]"));
        assert_eq!(reopened.get("markers").as_deref(), Some("[{\"id\":1}]"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path, None);
        assert!(store.get("drawings").is_none());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("storage.json");

        let mut store = FileStore::open(&path, None);
        store.set("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_quota_rejects_write_and_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut store = FileStore::open(&path, Some(16));
        store.set("k", "small").unwrap();
        let result = store.set("k", "this value is far too large");
        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));
        assert_eq!(store.get("k").as_deref(), Some("small"));

        let reopened = FileStore::open(&path, None);
        assert_eq!(reopened.get("k").as_deref(), Some("small"));
    }
}
