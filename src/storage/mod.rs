//! Local persistence layer.
//!
//! Conversion history and user settings live in JSON key-value store files
//! inside the data directory. Every change is written to disk immediately.

pub mod history;
pub mod settings;
pub mod store;

use std::path::PathBuf;

/// Directory name under the platform data dir.
const APP_DIR_NAME: &str = "media-convert";

/// Default data directory, e.g. `~/.local/share/media-convert` on Linux.
///
/// Falls back to the current directory when the platform has no data dir.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
}
