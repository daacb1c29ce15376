use std::collections::HashSet;
use std::path::{Path, PathBuf};

use base64::Engine;

use crate::error::AppError;
use crate::models::conversion::{ConversionKind, ConvertResponse};
use crate::models::history::HistoryRecord;
use crate::storage::store::JsonStore;

pub const STORE_FILE: &str = "history.json";

/// Persisted conversion history for one conversion kind, newest first.
///
/// The selection set is session state and is never persisted.
pub struct ConversionHistory {
    store: JsonStore,
    kind: ConversionKind,
    records: Vec<HistoryRecord>,
    selected: HashSet<String>,
}

impl ConversionHistory {
    /// Load the history for `kind` from the store file in `data_dir`.
    pub fn open(data_dir: &Path, kind: ConversionKind) -> crate::error::Result<Self> {
        let store = JsonStore::open(data_dir, STORE_FILE)?;
        let records = load_records(&store, kind);
        Ok(Self {
            store,
            kind,
            records,
            selected: HashSet::new(),
        })
    }

    pub fn kind(&self) -> ConversionKind {
        self.kind
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Record a successful conversion (newest first) and persist.
    pub fn add(&mut self, result: &ConvertResponse) -> HistoryRecord {
        let record = HistoryRecord::from_response(result, self.kind);
        self.records.insert(0, record.clone());
        self.persist();
        record
    }

    /// Remove a record by ID. Silently ignores non-existent IDs.
    pub fn remove(&mut self, id: &str) {
        self.records.retain(|r| r.id != id);
        self.selected.remove(id);
        self.persist();
    }

    pub fn remove_many(&mut self, ids: &[String]) {
        self.records.retain(|r| !ids.contains(&r.id));
        for id in ids {
            self.selected.remove(id);
        }
        self.persist();
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.selected.clear();
        self.persist();
    }

    pub fn toggle_selection(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.records.iter().map(|r| r.id.clone()).collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selected IDs in history order.
    pub fn selected(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| self.selected.contains(&r.id))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Decode a record's converted data and write it into `dir`.
    pub fn download_item(record: &HistoryRecord, dir: &Path) -> crate::error::Result<PathBuf> {
        write_converted(&record.filename, &record.converted_data, dir)
    }

    /// Download the given records in history order. Unknown IDs are skipped.
    pub fn download_many(&self, ids: &[String], dir: &Path) -> crate::error::Result<Vec<PathBuf>> {
        self.records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .map(|r| Self::download_item(r, dir))
            .collect()
    }

    /// Write the in-memory list back to the store. Failures are logged so a
    /// read-only data dir never breaks a conversion run.
    ///
    /// The store is re-read first: the file is shared between kinds (and
    /// processes), and only this kind's key may be replaced.
    fn persist(&mut self) {
        let value = match serde_json::to_value(&self.records) {
            Ok(v) => v,
            Err(e) => {
                log::error!("Failed to serialize conversion history: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.reload() {
            log::error!("Failed to reload conversion history store: {}", e);
            return;
        }
        self.store.set(self.kind.history_key(), value);
        if let Err(e) = self.store.save() {
            log::error!("Failed to save conversion history: {}", e);
        }
    }
}

/// Load records from store, returning empty vec if the key is missing or unreadable.
fn load_records(store: &JsonStore, kind: ConversionKind) -> Vec<HistoryRecord> {
    match store.get(kind.history_key()) {
        None => Vec::new(),
        Some(v) => serde_json::from_value(v).unwrap_or_else(|e| {
            log::error!("Failed to load conversion history: {}", e);
            Vec::new()
        }),
    }
}

/// Decode base64 `data` and write it as `dir/<file_name>`.
///
/// Only the final path component of `file_name` is used so a hostile name
/// cannot escape `dir`.
pub fn write_converted(file_name: &str, data: &str, dir: &Path) -> crate::error::Result<PathBuf> {
    let name = Path::new(file_name)
        .file_name()
        .ok_or_else(|| AppError::Validation(format!("Invalid output file name: {:?}", file_name)))?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
    std::fs::create_dir_all(dir)?;
    let target = dir.join(name);
    std::fs::write(&target, bytes)?;
    log::info!("Saved {}", target.display());
    Ok(target)
}
