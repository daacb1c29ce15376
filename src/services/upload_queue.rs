//! Upload queue — bounded list of files waiting for conversion.
//!
//! Validates candidates by count, size, type and duplication, tracks drag
//! state and selection, and notifies an optional observer whenever the file
//! list changes.

use std::collections::HashSet;

use crate::models::conversion::ConversionKind;
use crate::models::file::FileEntry;
use crate::models::upload::{UploadItem, UploadStatus};

/// Default maximum number of queued files.
pub const DEFAULT_MAX_FILES: usize = 10;
/// Default maximum size per file (50 MiB).
pub const DEFAULT_MAX_SIZE: u64 = 50 * 1024 * 1024;
/// Accept pattern matching every MIME type.
pub const ACCEPT_ANY: &str = "*";

const SIZE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Observer invoked with the full file list after every list mutation.
pub type FilesChangeCallback = Box<dyn Fn(&[UploadItem]) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub max_files: usize,
    pub max_size: u64,
    /// `"*"` or a comma-separated list of MIME fragments, e.g. `"image/png"`.
    pub accept: String,
    /// When false only the first candidate of each `add_files` call is considered.
    pub multiple: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_size: DEFAULT_MAX_SIZE,
            accept: ACCEPT_ANY.to_string(),
            multiple: true,
        }
    }
}

impl UploadOptions {
    /// Limits used by the converter for `kind`.
    pub fn for_kind(kind: ConversionKind) -> Self {
        Self {
            max_files: kind.max_files(),
            max_size: kind.max_size(),
            accept: kind.accept().to_string(),
            multiple: true,
        }
    }
}

#[derive(Default)]
pub struct UploadQueue {
    options: UploadOptions,
    files: Vec<UploadItem>,
    errors: Vec<String>,
    is_dragging: bool,
    selected: HashSet<String>,
    on_files_change: Option<FilesChangeCallback>,
}

impl UploadQueue {
    pub fn new(options: UploadOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Seed the queue with already-known files; they skip validation.
    pub fn with_initial_files(options: UploadOptions, initial: Vec<FileEntry>) -> Self {
        let mut queue = Self::new(options);
        queue.files = initial.into_iter().map(UploadItem::new).collect();
        queue
    }

    pub fn on_files_change(&mut self, callback: FilesChangeCallback) {
        self.on_files_change = Some(callback);
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    pub fn files(&self) -> &[UploadItem] {
        &self.files
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&UploadItem> {
        self.files.iter().find(|f| f.id == id)
    }

    pub(crate) fn item_mut(&mut self, id: &str) -> Option<&mut UploadItem> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut UploadItem> {
        self.files.iter_mut()
    }

    /// Validate `candidates` and append the accepted ones.
    ///
    /// Replaces the error list with this call's validation errors. Returns the
    /// IDs of the newly queued items.
    pub fn add_files(&mut self, candidates: Vec<FileEntry>) -> Vec<String> {
        let candidates = if self.options.multiple {
            candidates
        } else {
            candidates.into_iter().take(1).collect()
        };

        let (valid, errors) = self.validate(candidates);
        self.errors = errors;
        for msg in &self.errors {
            log::warn!("Rejected file: {}", msg);
        }

        if valid.is_empty() {
            return Vec::new();
        }

        let added: Vec<UploadItem> = valid.into_iter().map(UploadItem::new).collect();
        let ids = added.iter().map(|f| f.id.clone()).collect();
        self.files.extend(added);
        self.notify();
        ids
    }

    fn validate(&self, candidates: Vec<FileEntry>) -> (Vec<FileEntry>, Vec<String>) {
        let mut valid: Vec<FileEntry> = Vec::new();
        let mut errors = Vec::new();

        for file in candidates {
            if self.files.len() + valid.len() >= self.options.max_files {
                errors.push(format!("Maximum {} files allowed", self.options.max_files));
                break;
            }

            if file.file_size > self.options.max_size {
                errors.push(format!(
                    "File \"{}\" is too large. Maximum size is {}",
                    file.file_name,
                    format_bytes(self.options.max_size, 2)
                ));
                continue;
            }

            if !self.accepts(&file.mime_type) {
                errors.push(format!(
                    "File \"{}\" is not an accepted file type",
                    file.file_name
                ));
                continue;
            }

            let is_duplicate = self
                .files
                .iter()
                .map(|f| (f.name(), f.size()))
                .chain(valid.iter().map(|f| (f.file_name.as_str(), f.file_size)))
                .any(|(name, size)| name == file.file_name && size == file.file_size);
            if is_duplicate {
                errors.push(format!("File \"{}\" is already added", file.file_name));
                continue;
            }

            valid.push(file);
        }

        (valid, errors)
    }

    fn accepts(&self, mime_type: &str) -> bool {
        self.options.accept.trim() == ACCEPT_ANY
            || self
                .options
                .accept
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .any(|t| mime_type.contains(t))
    }

    pub fn remove_file(&mut self, id: &str) {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        self.selected.remove(id);
        if self.files.len() != before {
            self.notify();
        }
    }

    pub fn remove_files(&mut self, ids: &[String]) {
        let before = self.files.len();
        self.files.retain(|f| !ids.contains(&f.id));
        for id in ids {
            self.selected.remove(id);
        }
        if self.files.len() != before {
            self.notify();
        }
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
        self.errors.clear();
        self.selected.clear();
        self.notify();
    }

    pub fn drag_enter(&mut self) {
        self.is_dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.is_dragging = false;
    }

    /// Dragging over the drop target keeps the current state.
    pub fn drag_over(&mut self) {}

    pub fn drop_files(&mut self, entries: Vec<FileEntry>) -> Vec<String> {
        self.is_dragging = false;
        self.add_files(entries)
    }

    pub fn toggle_selection(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.files.iter().map(|f| f.id.clone()).collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn remove_selected(&mut self) {
        let ids: Vec<String> = self.selected.drain().collect();
        self.remove_files(&ids);
    }

    /// Put every failed item back to pending so the next batch picks it up.
    pub fn retry_failed(&mut self) -> usize {
        let mut count = 0;
        for file in self.files.iter_mut().filter(|f| f.status == UploadStatus::Error) {
            file.status = UploadStatus::Pending;
            file.progress = 0;
            file.error = None;
            count += 1;
        }
        count
    }

    pub fn with_status(&self, status: UploadStatus) -> Vec<&UploadItem> {
        self.files.iter().filter(|f| f.status == status).collect()
    }

    pub fn pending(&self) -> Vec<&UploadItem> {
        self.with_status(UploadStatus::Pending)
    }

    pub fn completed(&self) -> Vec<&UploadItem> {
        self.with_status(UploadStatus::Completed)
    }

    pub fn failed(&self) -> Vec<&UploadItem> {
        self.with_status(UploadStatus::Error)
    }

    fn notify(&self) {
        if let Some(callback) = &self.on_files_change {
            callback(&self.files);
        }
    }
}

/// Human readable 1024-based size, e.g. `1.5 KB`. Trailing zeros are trimmed.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    // Round half-up: 1.125 KB shows as 1.13 KB.
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round() / scale;
    let mut formatted = format!("{:.*}", decimals, rounded);
    if formatted.contains('.') {
        formatted = formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    }
    format!("{} {}", formatted, SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn entry(name: &str, size: u64, mime: &str) -> FileEntry {
        FileEntry {
            file_name: name.to_string(),
            file_path: format!("/tmp/{}", name),
            file_size: size,
            mime_type: mime.to_string(),
        }
    }

    fn png(name: &str) -> FileEntry {
        entry(name, 1024, "image/png")
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0, 2), "0 Bytes");
        assert_eq!(format_bytes(1023, 2), "1023 Bytes");
        assert_eq!(format_bytes(1024, 2), "1 KB");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(1152, 2), "1.13 KB");
        assert_eq!(format_bytes(1_234_567, 2), "1.18 MB");
        assert_eq!(format_bytes(50 * 1024 * 1024, 2), "50 MB");
        assert_eq!(format_bytes(200 * 1024 * 1024, 0), "200 MB");
    }

    #[test]
    fn test_add_files_accepts_valid() {
        let mut queue = UploadQueue::new(UploadOptions::default());
        let ids = queue.add_files(vec![png("a.png"), png("b.png")]);
        assert_eq!(ids.len(), 2);
        assert_eq!(queue.len(), 2);
        assert!(queue.errors().is_empty());
        assert!(queue.files().iter().all(|f| f.status == UploadStatus::Pending));
    }

    #[test]
    fn test_count_limit_stops_processing() {
        let options = UploadOptions {
            max_files: 2,
            ..Default::default()
        };
        let mut queue = UploadQueue::new(options);
        queue.add_files(vec![
            png("a.png"),
            png("b.png"),
            png("c.png"),
            entry("huge.png", u64::MAX, "image/png"),
        ]);
        assert_eq!(queue.len(), 2);
        // Processing stops at the first count violation; the oversized file is never checked.
        assert_eq!(queue.errors(), ["Maximum 2 files allowed".to_string()]);
    }

    #[test]
    fn test_oversized_file_skipped_but_rest_accepted() {
        let mut queue = UploadQueue::new(UploadOptions::default());
        queue.add_files(vec![
            entry("big.png", DEFAULT_MAX_SIZE + 1, "image/png"),
            png("ok.png"),
        ]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.files()[0].name(), "ok.png");
        assert_eq!(
            queue.errors(),
            ["File \"big.png\" is too large. Maximum size is 50 MB".to_string()]
        );
    }

    #[test]
    fn test_size_exactly_at_limit_is_accepted() {
        let mut queue = UploadQueue::new(UploadOptions::default());
        queue.add_files(vec![entry("edge.png", DEFAULT_MAX_SIZE, "image/png")]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_type_filter() {
        let mut queue = UploadQueue::new(UploadOptions::for_kind(ConversionKind::Image));
        queue.add_files(vec![entry("photo.jpg", 10, "image/jpeg"), png("ok.png")]);
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.errors(),
            ["File \"photo.jpg\" is not an accepted file type".to_string()]
        );
    }

    #[test]
    fn test_accept_list_with_spaces() {
        let options = UploadOptions {
            accept: "image/png, video/mp4".to_string(),
            ..Default::default()
        };
        let mut queue = UploadQueue::new(options);
        queue.add_files(vec![png("a.png"), entry("b.mp4", 10, "video/mp4")]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut queue = UploadQueue::new(UploadOptions::default());
        queue.add_files(vec![png("a.png")]);
        queue.add_files(vec![png("a.png"), entry("a.png", 2048, "image/png")]);
        // Same name with a different size is a different file.
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.errors(), ["File \"a.png\" is already added".to_string()]);
    }

    #[test]
    fn test_errors_replaced_on_each_call() {
        let mut queue = UploadQueue::new(UploadOptions::for_kind(ConversionKind::Image));
        queue.add_files(vec![entry("x.gif", 1, "image/gif")]);
        assert_eq!(queue.errors().len(), 1);
        queue.add_files(vec![png("fine.png")]);
        assert!(queue.errors().is_empty());
    }

    #[test]
    fn test_single_mode_takes_first_only() {
        let options = UploadOptions {
            multiple: false,
            ..Default::default()
        };
        let mut queue = UploadQueue::new(options);
        queue.add_files(vec![png("first.png"), png("second.png")]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.files()[0].name(), "first.png");
    }

    #[test]
    fn test_remove_and_clear() {
        let mut queue = UploadQueue::new(UploadOptions::default());
        let ids = queue.add_files(vec![png("a.png"), png("b.png"), png("c.png")]);
        queue.remove_file(&ids[0]);
        assert_eq!(queue.len(), 2);
        queue.remove_files(&ids[1..]);
        assert!(queue.is_empty());

        queue.add_files(vec![entry("bad.gif", 1, "image/gif")]);
        queue.clear_files();
        assert!(queue.is_empty());
        assert!(queue.errors().is_empty());
    }

    #[test]
    fn test_drag_state() {
        let mut queue = UploadQueue::new(UploadOptions::default());
        assert!(!queue.is_dragging());
        queue.drag_enter();
        queue.drag_over();
        assert!(queue.is_dragging());
        queue.drag_leave();
        assert!(!queue.is_dragging());

        queue.drag_enter();
        let ids = queue.drop_files(vec![png("dropped.png")]);
        assert!(!queue.is_dragging());
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_selection_and_remove_selected() {
        let mut queue = UploadQueue::new(UploadOptions::default());
        let ids = queue.add_files(vec![png("a.png"), png("b.png"), png("c.png")]);
        queue.toggle_selection(&ids[0]);
        queue.toggle_selection(&ids[2]);
        assert!(queue.is_selected(&ids[0]));
        queue.toggle_selection(&ids[2]);
        assert!(!queue.is_selected(&ids[2]));

        queue.remove_selected();
        assert_eq!(queue.len(), 2);
        assert!(queue.get(&ids[0]).is_none());

        queue.select_all();
        assert!(queue.is_selected(&ids[1]) && queue.is_selected(&ids[2]));
        queue.deselect_all();
        assert!(!queue.is_selected(&ids[1]));
    }

    #[test]
    fn test_removing_file_deselects_it() {
        let mut queue = UploadQueue::new(UploadOptions::default());
        let ids = queue.add_files(vec![png("a.png")]);
        queue.select_all();
        queue.remove_file(&ids[0]);
        assert!(!queue.is_selected(&ids[0]));
    }

    #[test]
    fn test_retry_failed_resets_errors_only() {
        let mut queue = UploadQueue::new(UploadOptions::default());
        let ids = queue.add_files(vec![png("a.png"), png("b.png")]);
        {
            let item = queue.item_mut(&ids[0]).unwrap();
            item.status = UploadStatus::Error;
            item.error = Some("boom".to_string());
        }
        queue.item_mut(&ids[1]).unwrap().status = UploadStatus::Completed;

        assert_eq!(queue.retry_failed(), 1);
        let retried = queue.get(&ids[0]).unwrap();
        assert_eq!(retried.status, UploadStatus::Pending);
        assert!(retried.error.is_none());
        assert_eq!(queue.completed().len(), 1);
        assert!(queue.failed().is_empty());
    }

    #[test]
    fn test_on_files_change_called_on_list_mutations() {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_len = Arc::new(AtomicUsize::new(usize::MAX));
        let mut queue = UploadQueue::new(UploadOptions::default());
        {
            let calls = calls.clone();
            let last_len = last_len.clone();
            queue.on_files_change(Box::new(move |files| {
                calls.fetch_add(1, Ordering::SeqCst);
                last_len.store(files.len(), Ordering::SeqCst);
            }));
        }

        let ids = queue.add_files(vec![png("a.png")]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(last_len.load(Ordering::SeqCst), 1);

        // Rejected-only batches do not touch the list.
        queue.add_files(vec![png("a.png")]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        queue.remove_file(&ids[0]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(last_len.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_initial_files_are_pending() {
        let queue =
            UploadQueue::with_initial_files(UploadOptions::default(), vec![png("seed.png")]);
        assert_eq!(queue.pending().len(), 1);
    }
}
