use serde::{Deserialize, Serialize};

use crate::models::conversion::VideoCompressionSettings;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
/// Large uploads can take a while; matches the backend's body limit handling.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Application-level settings persisted to settings.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Base URL of the conversion backend.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Last used MP4 -> WebM compression settings.
    pub video: VideoCompressionSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            video: VideoCompressionSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversion::CompressionQuality;

    #[test]
    fn serde_camel_case_keys() {
        let json = serde_json::to_string(&AppSettings::default()).unwrap();
        assert!(json.contains("apiBaseUrl"), "got: {}", json);
        assert!(json.contains("timeoutSecs"), "got: {}", json);
        assert!(!json.contains("api_base_url"), "got: {}", json);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"apiBaseUrl":"http://convert.lan:9000"}"#).unwrap();
        assert_eq!(settings.api_base_url, "http://convert.lan:9000");
        assert_eq!(settings.timeout_secs, 60);
        assert_eq!(settings.video.quality, CompressionQuality::High);
    }

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(AppSettings::default().api_base_url, "http://localhost:8080");
    }
}
