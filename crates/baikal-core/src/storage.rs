//! Durable client-side key/value state: a small JSON file in the user's
//! data directory holding the session token and the cached profile.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const TOKEN_KEY: &str = "baikal_token";
pub const USER_KEY: &str = "baikal_user";

#[derive(Debug)]
pub struct SessionStorage {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl SessionStorage {
    /// Open (or lazily create) the storage file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let data = fs::read(&path)?;
            serde_json::from_slice(&data).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "discarding unreadable session file");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// Storage in the default location, `<data dir>/baikal/session.json`.
    pub fn open_default() -> io::Result<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not determine data directory")
        })?;
        Self::open(data_dir.join("baikal").join("session.json"))
    }

    /// Storage that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        self.set_items(&[(key, value)])
    }

    /// Write several keys with a single flush. Either all of them land on
    /// disk and in memory, or none do.
    pub fn set_items(&self, items: &[(&str, &str)]) -> io::Result<()> {
        let mut entries = self.entries();
        let mut next = entries.clone();
        for (key, value) in items {
            next.insert(key.to_string(), value.to_string());
        }
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries();
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)?;
        match fs::rename(&tmp_path, path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if path.exists() {
                    fs::remove_file(path)?;
                    fs::rename(&tmp_path, path)
                } else {
                    Err(rename_err)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baikal").join("session.json");

        let storage = SessionStorage::open(&path).unwrap();
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        storage.set_item(USER_KEY, r#"{"name":"김철수"}"#).unwrap();
        drop(storage);

        let reopened = SessionStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item(TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(reopened.get_item(USER_KEY).as_deref(), Some(r#"{"name":"김철수"}"#));
    }

    #[test]
    fn test_remove_is_persisted_and_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let storage = SessionStorage::open(&path).unwrap();
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        storage.remove_item(TOKEN_KEY).unwrap();
        storage.remove_item(TOKEN_KEY).unwrap();

        let reopened = SessionStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item(TOKEN_KEY), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let storage = SessionStorage::open(&path).unwrap();
        assert_eq!(storage.get_item(TOKEN_KEY), None);
    }

    #[test]
    fn test_failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let storage = SessionStorage::open(blocker.join("session.json")).unwrap();
        assert!(storage.set_item(TOKEN_KEY, "tok").is_err());
        assert_eq!(storage.get_item(TOKEN_KEY), None);
        assert!(storage
            .set_items(&[(TOKEN_KEY, "tok"), (USER_KEY, "{}")])
            .is_err());
        assert_eq!(storage.get_item(USER_KEY), None);
    }

    #[test]
    fn test_failed_remove_keeps_value() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().join("baikal");
        let path = dir_path.join("session.json");
        let storage = SessionStorage::open(&path).unwrap();
        storage.set_item(TOKEN_KEY, "tok").unwrap();

        fs::remove_dir_all(&dir_path).unwrap();
        fs::write(&dir_path, "").unwrap();

        assert!(storage.remove_item(TOKEN_KEY).is_err());
        assert_eq!(storage.get_item(TOKEN_KEY).as_deref(), Some("tok"));
    }

    #[test]
    fn test_in_memory_has_no_path() {
        let storage = SessionStorage::in_memory();
        storage.set_item(TOKEN_KEY, "t").unwrap();
        assert_eq!(storage.get_item(TOKEN_KEY).as_deref(), Some("t"));
        assert!(storage.path().is_none());
    }
}
