//! Data models for the media-convert client.
//!
//! Shared data structures used across the application: resolved file entries,
//! conversion wire types, upload queue items, history records and settings.

pub mod conversion;
pub mod file;
pub mod history;
pub mod settings;
pub mod upload;
