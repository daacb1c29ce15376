use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::conversion::{ConversionKind, ConvertResponse};

/// A single conversion history record persisted to local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Unique identifier (UUID v4 hex, 32 chars).
    pub id: String,
    /// Output file name as returned by the backend.
    pub filename: String,
    pub original_size: u64,
    pub converted_size: u64,
    /// Percentage saved.
    pub compression_ratio: f64,
    /// Base64 encoded converted file.
    pub converted_data: String,
    pub kind: ConversionKind,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Build a fresh record for a successful conversion, stamped now.
    pub fn from_response(result: &ConvertResponse, kind: ConversionKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            filename: result.filename.clone(),
            original_size: result.original_size,
            converted_size: result.converted_size,
            compression_ratio: result.compression_ratio,
            converted_data: result.webp_data.clone(),
            kind,
            timestamp: Utc::now(),
        }
    }
}
