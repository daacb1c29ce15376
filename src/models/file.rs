//! File entry model for path resolution and the upload queue.

/// A resolved file candidate.
///
/// Produced by `resolve_dropped_paths` after recursively resolving user-provided paths
/// (files and directories). `mime_type` is sniffed from the file content, with
/// an extension-based fallback.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: String,
}
