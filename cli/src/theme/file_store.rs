use crate::config::setup::ensure_parent_dir;
use crate::error::{AppError, AppResult};
use engine::storage::{AreaId, StorageBackend, StorageEvent};
use engine::stream::Subscription;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A [`StorageBackend`] persisted as a flat JSON object.
///
/// Every mutation rewrites the file. [`StorageBackend`] setters cannot fail,
/// so a failed rewrite is held until [`FileStore::take_error`] collects it.
/// Other processes writing the same file
/// are not observed, so `watch` never fires; the coordinator only picks up
/// their value on the next start.
pub struct FileStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
    last_error: RefCell<Option<AppError>>,
}

impl FileStore {
    /// Opens `path`, treating a missing or blank file as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| AppError::io(&path, e))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    AppError::Storage(format!(
                        "State file {} is not a JSON object of strings: {e}",
                        path.display()
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };

        log::debug!("Opened state file {} ({} entries)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: RefCell::new(entries),
            last_error: RefCell::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> AppResult<()> {
        ensure_parent_dir(&self.path)?;
        let json = serde_json::to_string_pretty(&*self.entries.borrow())
            .map_err(|e| AppError::Storage(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| AppError::io(&self.path, e))
    }

    /// The most recent failed rewrite since the last call, if any.
    pub fn take_error(&self) -> Option<AppError> {
        self.last_error.borrow_mut().take()
    }

    fn write_back(&self) {
        if let Err(e) = self.persist() {
            log::debug!("Failed to persist state: {e}");
            *self.last_error.borrow_mut() = Some(e);
        }
    }
}

impl StorageBackend for FileStore {
    fn area(&self) -> AreaId {
        AreaId::new(self.path.display().to_string())
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let previous = self
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            self.write_back();
        }
    }

    fn remove_item(&self, key: &str) {
        let removed = self.entries.borrow_mut().remove(key);
        if removed.is_some() {
            self.write_back();
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    fn watch(&self, _listener: Rc<dyn Fn(&StorageEvent)>) -> Subscription {
        Subscription::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state.json")).unwrap();

        assert!(store.keys().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileStore::open(&path).unwrap();
        store.set_item("themesync.theme", "dark");
        store.set_item("other", "1");
        store.remove_item("other");

        let reopened = FileStore::open(&path).unwrap();
        assert_some_eq!(reopened.get_item("themesync.theme"), "dark".to_string());
        assert_eq!(reopened.keys(), vec!["themesync.theme".to_string()]);
    }

    #[test]
    fn test_unchanged_value_does_not_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStore::open(&path).unwrap();
        store.set_item("k", "v");
        fs::remove_file(&path).unwrap();

        store.set_item("k", "v");

        assert!(!path.exists());
    }

    #[test]
    fn test_failed_rewrite_is_held_until_taken() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStore::open(&path).unwrap();
        store.set_item("k", "v");
        assert_none!(store.take_error());

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        store.set_item("k", "w");

        assert!(matches!(store.take_error(), Some(AppError::Io { .. })));
        assert_none!(store.take_error());
        assert_some_eq!(store.get_item("k"), "w".to_string());
    }

    #[test]
    fn test_malformed_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(FileStore::open(&path), Err(AppError::Storage(_))));
    }

    #[test]
    fn test_area_is_the_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStore::open(&path).unwrap();

        assert_eq!(store.area().as_str(), path.display().to_string());
    }
}
