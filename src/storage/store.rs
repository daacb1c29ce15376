//! Minimal JSON key-value store backed by a single file.
//!
//! Values are kept in memory and flushed with `save()`. Saving writes a
//! sibling temp file and renames it over the target so a crash never leaves a
//! half-written store behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::AppError;

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonStore {
    /// Open (or lazily create) the store file `file_name` inside `dir`.
    ///
    /// A missing file yields an empty store. A file that is not a JSON object
    /// is logged and treated as empty; it is replaced on the next `save()`.
    pub fn open(dir: &Path, file_name: &str) -> crate::error::Result<Self> {
        let path = dir.join(file_name);
        let entries = read_entries(&path)?;
        Ok(Self { path, entries })
    }

    /// Re-read the file, dropping in-memory changes. Other writers' keys
    /// become visible again before the next `set`/`save`.
    pub fn reload(&mut self) -> crate::error::Result<()> {
        self.entries = read_entries(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    /// Persist the current contents to disk.
    pub fn save(&self) -> crate::error::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| AppError::Storage(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> crate::error::Result<Map<String, Value>> {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                log::error!("Ignoring unreadable store {}: {}", path.display(), e);
                Ok(Map::new())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
        Err(e) => Err(AppError::Storage(format!("{}: {}", path.display(), e))),
    }
}
