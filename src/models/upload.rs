use serde::{Deserialize, Serialize};

use crate::models::conversion::ConvertResponse;
use crate::models::file::FileEntry;

/// Lifecycle of a queued file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Error,
}

/// A file in the upload queue together with its conversion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadItem {
    /// Unique identifier (UUID v4 hex, 32 chars).
    pub id: String,
    pub entry: FileEntry,
    pub status: UploadStatus,
    /// 0..=100
    pub progress: u8,
    pub error: Option<String>,
    pub result: Option<ConvertResponse>,
}

impl UploadItem {
    pub fn new(entry: FileEntry) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            entry,
            status: UploadStatus::Pending,
            progress: 0,
            error: None,
            result: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.entry.file_name
    }

    pub fn size(&self) -> u64 {
        self.entry.file_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> FileEntry {
        FileEntry {
            file_name: "clip.mp4".to_string(),
            file_path: "/tmp/clip.mp4".to_string(),
            file_size: 4096,
            mime_type: "video/mp4".to_string(),
        }
    }

    #[test]
    fn new_item_is_pending_with_hex_id() {
        let item = UploadItem::new(entry());
        assert_eq!(item.status, UploadStatus::Pending);
        assert_eq!(item.progress, 0);
        assert!(item.error.is_none());
        assert!(item.result.is_none());
        assert_eq!(item.id.len(), 32);
        assert!(item.id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn ids_are_unique() {
        let a = UploadItem::new(entry());
        let b = UploadItem::new(entry());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&UploadStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
