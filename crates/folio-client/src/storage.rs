//! Key/value persistence backends for client-side state.
//!
//! The token store and session manager keep a handful of string values
//! (tokens, the serialized user, the login time). [`Storage`] hides where
//! they live: in memory for tests, in a JSON file for the CLI, or nowhere
//! at all when no persistent storage is available.
//!
//! Storage never fails outward. Write errors are logged and dropped; the
//! in-memory view stays authoritative for the running process.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use tracing::{debug, warn};

/// Process-wide key/value storage.
pub trait Storage: Send + Sync {
    /// `false` when writes are discarded and reads always miss.
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Option<String>;

    /// Write all entries as one operation.
    fn set_many(&self, entries: &[(&str, String)]);

    /// Remove all keys as one operation. Missing keys are ignored.
    fn remove_many(&self, keys: &[&str]);
}

// ─── Unavailable ─────────────────────────────────────────────────────────────

/// Storage for environments without persistence: reads miss, writes vanish.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl Storage for UnavailableStorage {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_many(&self, _entries: &[(&str, String)]) {}

    fn remove_many(&self, _keys: &[&str]) {}
}

// ─── Memory ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_many(&self, entries: &[(&str, String)]) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            map.insert((*key).to_owned(), value.clone());
        }
    }

    fn remove_many(&self, keys: &[&str]) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            map.remove(*key);
        }
    }
}

// ─── File ────────────────────────────────────────────────────────────────────

/// A JSON object on disk, rewritten in full on every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file opens empty. So does an unreadable or corrupt one,
    /// with a warning; the next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries: BTreeMap<String, String> = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), "Ignoring unreadable session file: {e}");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), "Cannot read session file: {e}");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened file storage");
        Self { path, entries: Mutex::new(entries) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        if let Err(e) = write_atomically(&self.path, entries) {
            warn!(path = %self.path.display(), "Failed to persist session file: {e}");
        }
    }
}

fn write_atomically(path: &Path, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(entries)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_many(&self, entries: &[(&str, String)]) {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            map.insert((*key).to_owned(), value.clone());
        }
        self.persist(&map);
    }

    fn remove_many(&self, keys: &[&str]) {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() != before {
            self.persist(&map);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_storage_discards_writes() {
        let storage = UnavailableStorage;
        storage.set_many(&[("k", "v".into())]);
        assert!(!storage.is_available());
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set_many(&[("a", "1".into()), ("b", "2".into())]);
        assert_eq!(storage.get("a").as_deref(), Some("1"));
        storage.remove_many(&["a", "missing"]);
        assert_eq!(storage.get("a"), None);
        assert_eq!(storage.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::open(&path);
        storage.set_many(&[("accessToken", "a1".into()), ("refreshToken", "r1".into())]);
        drop(storage);

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("accessToken").as_deref(), Some("a1"));
        reopened.remove_many(&["accessToken"]);

        let again = FileStorage::open(&path);
        assert_eq!(again.get("accessToken"), None);
        assert_eq!(again.get("refreshToken").as_deref(), Some("r1"));
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get("accessToken"), None);
        storage.set_many(&[("accessToken", "fresh".into())]);
        assert_eq!(FileStorage::open(&path).get("accessToken").as_deref(), Some("fresh"));
    }
}
