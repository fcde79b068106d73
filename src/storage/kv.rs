use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::StorageError;

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// A key-value store kept as a single JSON object on disk.
///
/// The whole file is rewritten on every mutation via a temp file and a rename,
/// so a crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store. An unparsable file is logged and
    /// treated as empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt store file, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entries` to disk and adopt them only once the write has landed,
    /// so a failed write leaves memory matching the file.
    fn commit(&mut self, entries: BTreeMap<String, String>) -> Result<(), StorageError> {
        self.write(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.commit(next)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        let mut next = self.entries.clone();
        next.remove(key);
        self.commit(next)
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub entries: BTreeMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
