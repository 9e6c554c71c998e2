#![forbid(unsafe_code)]

//! Key-value storage for persisted preferences.
//!
//! The layout store reads its blob once at startup and writes it back on
//! every change. [`PreferenceStorage`] is the seam; two backends ship here:
//!
//! | Backend         | Persistence | Use case                          |
//! |-----------------|-------------|-----------------------------------|
//! | [`MemoryStorage`] | process     | tests, ephemeral sessions         |
//! | [`FileStorage`]   | disk (JSON) | native hosts                      |
//!
//! Browser hosts implement the trait over `localStorage`.
//!
//! # File format
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "entries": { "weekly-board.column-preferences": "{...}" }
//! }
//! ```
//!
//! Writes go to a sibling temp file which is then renamed over the target,
//! so a crash mid-write leaves the previous file intact.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage corruption: {0}")]
    Corruption(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String key-value store.
pub trait PreferenceStorage {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Value stored under `key`, or `None` if nothing was ever written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: PreferenceStorage + ?Sized> PreferenceStorage for std::rc::Rc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory backend. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated storage, for tests.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut data) = storage.data.write() {
            data.insert(key.to_owned(), value.to_owned());
        }
        storage
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().map_or(0, |data| data.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<E>(_: E) -> StorageError {
    StorageError::Unavailable("memory storage lock poisoned".into())
}

impl PreferenceStorage for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        data.remove(key);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    format_version: u32,
    #[serde(default)]
    entries: HashMap<String, String>,
}

impl StoreFile {
    const FORMAT_VERSION: u32 = 1;

    fn new() -> Self {
        Self {
            format_version: Self::FORMAT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// JSON file backend with atomic writes.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn load(&self) -> StorageResult<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let file: StoreFile = serde_json::from_reader(reader)?;
        if file.format_version != StoreFile::FORMAT_VERSION {
            return Err(StorageError::Corruption(format!(
                "unsupported format version {} (expected {})",
                file.format_version,
                StoreFile::FORMAT_VERSION
            )));
        }
        Ok(file)
    }

    /// Load for a read-modify-write. An unreadable file is replaced rather
    /// than blocking every future write.
    fn load_for_update(&self) -> StorageResult<StoreFile> {
        match self.load() {
            Ok(file) => Ok(file),
            Err(StorageError::Io(err)) => Err(StorageError::Io(err)),
            Err(err) => {
                tracing::warn!(
                    target: "planboard.storage",
                    path = %self.path.display(),
                    error = %err,
                    "discarding unreadable preference file"
                );
                Ok(StoreFile::new())
            }
        }
    }

    fn save(&self, file: &StoreFile) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, file)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(
            target: "planboard.storage",
            path = %self.path.display(),
            entries = file.entries.len(),
            "preference file written"
        );
        Ok(())
    }
}

impl PreferenceStorage for FileStorage {
    fn name(&self) -> &str {
        "FileStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut file = self.load_for_update()?;
        file.entries.insert(key.to_owned(), value.to_owned());
        self.save(&file)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut file = self.load_for_update()?;
        if file.entries.remove(key).is_some() {
            self.save(&file)?;
        }
        Ok(())
    }
}
