//! Local key-value persistence for conversations and the auth session.
//!
//! The store is deliberately a flat string-to-string map: each conversation
//! transcript and the registry live under separate keys, written
//! independently with no cross-key transactionality. A missing key is
//! absence, not an error.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use uuid::Uuid;

pub const CONVERSATIONS_KEY: &str = "tosca_conversations";
pub const USER_KEY: &str = "tosca_user";

pub fn messages_key(conversation_id: Uuid) -> String {
    format!("tosca_messages_{conversation_id}")
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "store I/O error: {err}"),
            StoreError::Unavailable(reason) => write!(f, "store unavailable: {reason}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

/// Persistence boundary: string key to string value, last writer wins.
/// Injected into the registry and pipeline so tests can swap in
/// [`MemoryStore`].
pub trait ConversationStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// File-backed store: one file per key under the platform data directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new() -> Result<Self, StoreError> {
        let proj_dirs = ProjectDirs::from("org", "toscanisoft", "tosca").ok_or_else(|| {
            StoreError::Unavailable("could not determine a data directory".to_string())
        })?;
        Self::with_root(proj_dirs.data_dir().join("store"))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal identifiers (uuid-based); sanitize anyway so a
        // stray separator can never escape the store root.
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file_name}.json"))
    }
}

impl ConversationStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryStore::new();
        assert!(store.get("missing").unwrap().is_none());
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::with_root(dir.path()).unwrap();
            store.set(CONVERSATIONS_KEY, "[1,2,3]").unwrap();
        }
        let store = FileStore::with_root(dir.path()).unwrap();
        assert_eq!(
            store.get(CONVERSATIONS_KEY).unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::with_root(dir.path()).unwrap();
        store.set("../escape/attempt", "x").unwrap();
        assert_eq!(store.get("../escape/attempt").unwrap().as_deref(), Some("x"));
        // Nothing may be written outside the store root.
        assert!(dir.path().join("___escape_attempt.json").exists());
    }

    #[test]
    fn removing_a_missing_key_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::with_root(dir.path()).unwrap();
        assert!(store.remove("never_written").is_ok());
    }
}
