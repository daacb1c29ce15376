//! File resolution for the convert command.
//!
//! Resolves user-provided paths into a flat list of file entries. Directories
//! are recursively traversed. Hidden files and known system files are filtered
//! out. The MIME type of every file is sniffed from its content.

use crate::error::AppError;
use crate::models::file::FileEntry;
use std::path::Path;

/// System file names that should be filtered out regardless of location.
const SYSTEM_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Directory names that should be skipped during recursive traversal.
const SYSTEM_DIRS: &[&str] = &["__MACOSX"];

const FALLBACK_MIME: &str = "application/octet-stream";

/// Returns true if the given file/directory name should be excluded.
fn is_hidden_or_system(name: &str) -> bool {
    name.starts_with('.') || SYSTEM_FILES.contains(&name) || SYSTEM_DIRS.contains(&name)
}

/// MIME type from the file's magic bytes, falling back to its extension.
pub fn detect_mime(path: &Path) -> String {
    match infer::get_from_path(path) {
        Ok(Some(kind)) => return kind.mime_type().to_string(),
        Ok(None) => {}
        Err(e) => log::warn!("Could not sniff {}: {}", path.display(), e),
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        _ => FALLBACK_MIME,
    }
    .to_string()
}

/// Adds a single file entry without filtering (used for user-provided top-level paths).
fn add_file_entry(path: &Path, entries: &mut Vec<FileEntry>) -> Result<(), AppError> {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return Ok(()),
    };
    let metadata = std::fs::metadata(path)?;
    entries.push(FileEntry {
        file_name: name.to_string(),
        file_path: path.to_string_lossy().to_string(),
        file_size: metadata.len(),
        mime_type: detect_mime(path),
    });
    Ok(())
}

/// Recursively collects file entries from a directory's contents.
///
/// Hidden and system files/directories are filtered out during traversal.
/// This is only applied to children discovered during recursion, not to
/// user-provided top-level paths.
fn collect_dir_contents(dir: &Path, entries: &mut Vec<FileEntry>) -> Result<(), AppError> {
    let mut children: Vec<_> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    // read_dir order is platform dependent; keep the queue order stable.
    children.sort();
    for child in children {
        let name = match child.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if is_hidden_or_system(name) {
            continue;
        }
        if child.is_file() {
            add_file_entry(&child, entries)?;
        } else if child.is_dir() {
            collect_dir_contents(&child, entries)?;
        }
    }
    Ok(())
}

/// Resolves file/directory paths into a flat list of file entries.
///
/// - Regular files are returned directly.
/// - Directories are recursively traversed.
/// - Hidden files (names starting with `.`) and system files
///   (`.DS_Store`, `Thumbs.db`, `desktop.ini`, `__MACOSX`) are filtered out.
/// - Returns an error if any path does not exist.
pub async fn resolve_dropped_paths(paths: Vec<String>) -> crate::error::Result<Vec<FileEntry>> {
    tokio::task::spawn_blocking(move || resolve_paths_inner(paths))
        .await
        .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {}", e)))?
}

fn resolve_paths_inner(paths: Vec<String>) -> crate::error::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for path_str in &paths {
        let path = Path::new(path_str);
        if !path.exists() {
            return Err(AppError::Io(format!("Path does not exist: {}", path_str)));
        }
        if path.is_file() {
            add_file_entry(path, &mut entries)?;
        } else if path.is_dir() {
            collect_dir_contents(path, &mut entries)?;
        }
    }
    Ok(entries)
}
