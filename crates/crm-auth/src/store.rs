//! Persistent key-value storage for session state
//!
//! `KeyValueStore` is the seam between the HTTP client and wherever the
//! application keeps its session: an in-memory map for tests and ephemeral
//! sessions, or a JSON file that survives restarts.
//!
//! `set_many` and `remove_many` apply all entries under one lock and one
//! persist, so a token pair is never observed half-written.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// String key-value storage, durable or not depending on the implementation.
///
/// Uses `Pin<Box<dyn Future>>` return types so the client can hold an
/// `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    /// Write every entry as one unit.
    fn set_many(&self, entries: Vec<(String, String)>) -> StoreFuture<'_, ()>;

    /// Remove every key as one unit. Missing keys are ignored.
    fn remove_many(&self, keys: Vec<String>) -> StoreFuture<'_, ()>;

    fn set(&self, key: &str, value: String) -> StoreFuture<'_, ()> {
        self.set_many(vec![(key.to_owned(), value)])
    }

    fn remove(&self, key: &str) -> StoreFuture<'_, ()> {
        self.remove_many(vec![key.to_owned()])
    }
}

/// In-process store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Clone of the current contents.
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().await.clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.entries.lock().await.get(key).cloned()) })
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.entries.lock().await;
            state.extend(entries);
            Ok(())
        })
    }

    fn remove_many(&self, keys: Vec<String>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.entries.lock().await;
            for key in &keys {
                state.remove(key);
            }
            Ok(())
        })
    }
}

/// JSON file store.
///
/// The file holds a single JSON object of string values. The Mutex serializes
/// all writes; every write replaces the whole file atomically.
pub struct FileStore {
    path: PathBuf,
    state: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Load the store from the given file path.
    ///
    /// If the file doesn't exist, creates it as `{}` (no session yet).
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading session file: {e}")))?;
            let entries: HashMap<String, String> = serde_json::from_str(&contents)
                .map_err(|e| Error::CredentialParse(format!("parsing session file: {e}")))?;
            info!(path = %path.display(), keys = entries.len(), "loaded session store");
            entries
        } else {
            info!(path = %path.display(), "session file not found, starting with empty store");
            let entries = HashMap::new();
            write_atomic(&path, &entries).await?;
            entries
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.state.lock().await.get(key).cloned()) })
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let count = entries.len();
            state.extend(entries);
            debug!(count, "stored session keys");
            write_atomic(&self.path, &state).await
        })
    }

    fn remove_many(&self, keys: Vec<String>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let before = state.len();
            for key in &keys {
                state.remove(key);
            }
            if state.len() == before {
                return Ok(());
            }
            debug!(removed = before - state.len(), "removed session keys");
            write_atomic(&self.path, &state).await
        })
    }
}

/// Write the store to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. Permissions are 0600 since the file holds bearer tokens.
async fn write_atomic(path: &Path, data: &HashMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::CredentialParse(format!("serializing session: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("session path has no parent directory".into()))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Io("session path has no file name".into()))?;
    // temp name is unique per target file
    let tmp_path = dir.join(format!(
        ".{}.tmp.{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp session file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting session file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session store");
    Ok(())
}
