//! Persistent store adapter
//!
//! String-keyed get/set/remove over a durable medium. Values are raw strings;
//! most keys hold JSON, which [`get_json`] and [`set_json`] take care of.
//! Two backends: [`MemoryStore`] and [`JsonFileStore`] (one JSON object on
//! disk, rewritten on every write).

use crate::config::app::{NAME, STORE_FILE};
use crate::error::{BoardError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable string-keyed storage
///
/// Writes are synchronous and visible to the next read. There is no
/// versioning: a later write from anyone silently replaces an earlier one.
pub trait KeyValueStore {
    /// Read a raw value, `None` if the key was never written or was removed
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a raw value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a key (removing a missing key is fine)
    fn remove(&mut self, key: &str) -> Result<()>;

    /// All keys currently present, in ascending order
    fn keys(&self) -> Result<Vec<String>>;
}

/// Read and parse a JSON value
///
/// Returns `None` if the key is missing or holds only whitespace.
/// Returns an error if the value exists but can't be parsed.
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let content = match store.get(key)? {
        Some(c) => c,
        None => return Ok(None),
    };

    // Empty value is treated as non-existent
    if content.trim().is_empty() {
        return Ok(None);
    }

    let data = serde_json::from_str(&content).map_err(|source| BoardError::Parse {
        key: key.to_string(),
        source,
    })?;

    Ok(Some(data))
}

/// Serialize a value as JSON and write it
pub fn set_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    data: &T,
) -> Result<()> {
    let content = serde_json::to_string(data)?;
    store.set(key, &content)
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store, lost when dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Memory store whose writes can be switched to fail
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct FailingStore {
    inner: MemoryStore,
    failing: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(test)]
impl FailingStore {
    pub(crate) fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing: Default::default(),
        }
    }

    /// Handle that toggles failures after the store has been moved away
    pub(crate) fn switch(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        std::sync::Arc::clone(&self.failing)
    }

    pub(crate) fn fail(&self, on: bool) {
        self.failing.store(on, std::sync::atomic::Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(BoardError::Storage("Disk is full".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}

// =============================================================================
// JsonFileStore
// =============================================================================

/// File-backed store
///
/// Holds every key in one JSON object. The whole file is read on open and
/// rewritten after each `set`/`remove`, so the file is never more than one
/// write behind memory.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) a store at a specific path
    ///
    /// A missing or empty file opens as an empty store; the file is created
    /// on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = load_from::<BTreeMap<String, String>>(&path)?.unwrap_or_default();
        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened store");
        Ok(Self { path, entries })
    }

    /// Open the store in the default config directory
    pub fn open_default() -> Result<Self> {
        Self::open(data_path(STORE_FILE)?)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        save_to(&self.path, &self.entries)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

// =============================================================================
// Paths
// =============================================================================

/// Get the application config directory path
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir().map(|p| p.join(NAME)).ok_or_else(|| {
        BoardError::Config(
            "Could not determine config directory. HOME environment variable may not be set."
                .to_string(),
        )
    })
}

/// Get path to a specific data file in the default config directory
pub fn data_path(filename: &str) -> Result<PathBuf> {
    Ok(config_dir()?.join(filename))
}

// =============================================================================
// File I/O
// =============================================================================

/// Create a directory if it doesn't exist, with proper error handling
fn create_dir_if_needed(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let msg = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("Permission denied: cannot create directory {:?}", path)
                }
                _ => format!("Failed to create directory {:?}: {}", path, e),
            };
            Err(BoardError::Storage(msg))
        }
    }
}

/// Read file contents, `None` if the file doesn't exist
fn read_file(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            ErrorKind::PermissionDenied => Err(BoardError::Storage(format!(
                "Permission denied: cannot read {:?}",
                path
            ))),
            _ => Err(BoardError::Storage(format!("Failed to read {:?}: {}", path, e))),
        },
    }
}

/// Write file contents with proper error handling
fn write_file(path: &Path, content: &str) -> Result<()> {
    match fs::write(path, content) {
        Ok(()) => Ok(()),
        Err(e) => {
            let msg = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("Permission denied: cannot write to {:?}", path)
                }
                ErrorKind::ReadOnlyFilesystem => {
                    format!("Cannot write to {:?}: filesystem is read-only", path)
                }
                ErrorKind::StorageFull => {
                    format!("Cannot write to {:?}: no space left on device", path)
                }
                _ => format!("Failed to write to {:?}: {}", path, e),
            };
            Err(BoardError::Storage(msg))
        }
    }
}

/// Load data from a JSON file at a specific path
fn load_from<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match read_file(path)? {
        Some(c) => c,
        None => return Ok(None),
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    let data = serde_json::from_str(&content).map_err(|source| BoardError::Parse {
        key: path.display().to_string(),
        source,
    })?;

    Ok(Some(data))
}

/// Save data to a JSON file at a specific path, creating parent directories
fn save_to<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_if_needed(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(data)?;
    write_file(path, &content)
}
