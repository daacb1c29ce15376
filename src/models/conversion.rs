//! Conversion kinds, compression settings and the backend wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// The two conversions offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionKind {
    /// PNG -> WebP
    Image,
    /// MP4 -> WebM
    Video,
}

impl ConversionKind {
    /// MIME fragment accepted by the upload queue for this kind.
    pub fn accept(&self) -> &'static str {
        match self {
            ConversionKind::Image => "image/png",
            ConversionKind::Video => "video/mp4",
        }
    }

    pub fn max_files(&self) -> usize {
        match self {
            ConversionKind::Image => 10,
            ConversionKind::Video => 20,
        }
    }

    pub fn max_size(&self) -> u64 {
        match self {
            ConversionKind::Image => 50 * MIB,
            ConversionKind::Video => 200 * MIB,
        }
    }

    /// Storage key of the history log for this kind.
    pub fn history_key(&self) -> &'static str {
        match self {
            ConversionKind::Image => "png-to-webp-history",
            ConversionKind::Video => "mp4-to-webm-history",
        }
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionKind::Image => write!(f, "image"),
            ConversionKind::Video => write!(f, "video"),
        }
    }
}

impl FromStr for ConversionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" | "png" | "webp" => Ok(ConversionKind::Image),
            "video" | "mp4" | "webm" => Ok(ConversionKind::Video),
            other => Err(format!("Unknown conversion kind: {}", other)),
        }
    }
}

/// Video compression level sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionQuality {
    Maximum,
    #[default]
    High,
    Balanced,
    Low,
    Minimal,
}

impl CompressionQuality {
    pub const ALL: [CompressionQuality; 5] = [
        CompressionQuality::Maximum,
        CompressionQuality::High,
        CompressionQuality::Balanced,
        CompressionQuality::Low,
        CompressionQuality::Minimal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionQuality::Maximum => "maximum",
            CompressionQuality::High => "high",
            CompressionQuality::Balanced => "balanced",
            CompressionQuality::Low => "low",
            CompressionQuality::Minimal => "minimal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompressionQuality::Maximum => "Maximum Compression",
            CompressionQuality::High => "High Compression",
            CompressionQuality::Balanced => "Balanced",
            CompressionQuality::Low => "Low Compression",
            CompressionQuality::Minimal => "Minimal Compression",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CompressionQuality::Maximum => "Smallest file size, lower quality",
            CompressionQuality::High => "Good balance of size and quality",
            CompressionQuality::Balanced => "Balanced compression and quality",
            CompressionQuality::Low => "Better quality, larger file size",
            CompressionQuality::Minimal => "Highest quality, largest file size",
        }
    }

    pub fn estimated_reduction(&self) -> &'static str {
        match self {
            CompressionQuality::Maximum => "~70-85% reduction",
            CompressionQuality::High => "~60-75% reduction",
            CompressionQuality::Balanced => "~50-65% reduction",
            CompressionQuality::Low => "~35-50% reduction",
            CompressionQuality::Minimal => "~20-35% reduction",
        }
    }

    pub fn speed(&self) -> &'static str {
        match self {
            CompressionQuality::Maximum => "Fast",
            CompressionQuality::High | CompressionQuality::Balanced => "Medium",
            CompressionQuality::Low => "Slow",
            CompressionQuality::Minimal => "Slowest",
        }
    }
}

impl fmt::Display for CompressionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompressionQuality::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown quality '{}', expected one of: maximum, high, balanced, low, minimal",
                    s
                )
            })
    }
}

/// Audio bitrate for the re-encoded WebM audio track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioBitrate {
    #[serde(rename = "32k")]
    K32,
    #[default]
    #[serde(rename = "64k")]
    K64,
    #[serde(rename = "96k")]
    K96,
    #[serde(rename = "128k")]
    K128,
    #[serde(rename = "192k")]
    K192,
}

impl AudioBitrate {
    pub const ALL: [AudioBitrate; 5] = [
        AudioBitrate::K32,
        AudioBitrate::K64,
        AudioBitrate::K96,
        AudioBitrate::K128,
        AudioBitrate::K192,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioBitrate::K32 => "32k",
            AudioBitrate::K64 => "64k",
            AudioBitrate::K96 => "96k",
            AudioBitrate::K128 => "128k",
            AudioBitrate::K192 => "192k",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AudioBitrate::K32 => "32 kbps - Very Low",
            AudioBitrate::K64 => "64 kbps - Low (Default)",
            AudioBitrate::K96 => "96 kbps - Medium",
            AudioBitrate::K128 => "128 kbps - High",
            AudioBitrate::K192 => "192 kbps - Very High",
        }
    }
}

impl fmt::Display for AudioBitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioBitrate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        AudioBitrate::ALL
            .into_iter()
            .find(|b| b.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown audio bitrate '{}', expected one of: 32k, 64k, 96k, 128k, 192k",
                    s
                )
            })
    }
}

/// Settings forwarded with every MP4 -> WebM request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCompressionSettings {
    pub quality: CompressionQuality,
    #[serde(default)]
    pub audio_bitrate: AudioBitrate,
}

/// Successful conversion response returned by the backend.
///
/// `webp_data` holds the base64 encoded output for both kinds; the backend
/// kept the field name when video support was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub webp_data: String,
    pub original_size: u64,
    pub converted_size: u64,
    /// Percentage saved.
    pub compression_ratio: f64,
}

/// Error body returned by the backend on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: String,
    pub code: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_limits_match_converter_pages() {
        assert_eq!(ConversionKind::Image.max_files(), 10);
        assert_eq!(ConversionKind::Image.max_size(), 50 * 1024 * 1024);
        assert_eq!(ConversionKind::Video.max_files(), 20);
        assert_eq!(ConversionKind::Video.max_size(), 200 * 1024 * 1024);
    }

    #[test]
    fn kind_history_keys_are_distinct() {
        assert_eq!(ConversionKind::Image.history_key(), "png-to-webp-history");
        assert_ne!(
            ConversionKind::Image.history_key(),
            ConversionKind::Video.history_key()
        );
    }

    #[test]
    fn quality_parses_case_insensitively() {
        assert_eq!(
            "Balanced".parse::<CompressionQuality>().unwrap(),
            CompressionQuality::Balanced
        );
        assert!("ultra".parse::<CompressionQuality>().is_err());
    }

    #[test]
    fn default_video_settings_are_high_and_64k() {
        let settings = VideoCompressionSettings::default();
        assert_eq!(settings.quality, CompressionQuality::High);
        assert_eq!(settings.audio_bitrate, AudioBitrate::K64);
    }

    #[test]
    fn audio_bitrate_serializes_as_wire_value() {
        let json = serde_json::to_string(&AudioBitrate::K128).unwrap();
        assert_eq!(json, "\"128k\"");
        assert_eq!(" 96K ".parse::<AudioBitrate>().unwrap(), AudioBitrate::K96);
    }

    #[test]
    fn video_settings_without_bitrate_fall_back_to_default() {
        let settings: VideoCompressionSettings =
            serde_json::from_str(r#"{"quality":"low"}"#).unwrap();
        assert_eq!(settings.quality, CompressionQuality::Low);
        assert_eq!(settings.audio_bitrate, AudioBitrate::K64);
    }

    #[test]
    fn convert_response_uses_snake_case_wire_keys() {
        let body = r#"{
            "success": true,
            "message": "Image converted successfully",
            "filename": "cat.webp",
            "webp_data": "UklGRg==",
            "original_size": 2048,
            "converted_size": 512,
            "compression_ratio": 75.0
        }"#;
        let resp: ConvertResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.filename, "cat.webp");
        assert_eq!(resp.original_size, 2048);
        assert_eq!(resp.converted_size, 512);
        assert!((resp.compression_ratio - 75.0).abs() < f64::EPSILON);
    }
}
