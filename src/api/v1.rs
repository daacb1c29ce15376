//! ConversionApiV1 — concrete implementation of the ConversionApi trait.
//!
//! Talks multipart/form-data to `/api/convert` (PNG -> WebP) and
//! `/api/convert-video` (MP4 -> WebM) and translates failures into
//! user-facing messages.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use super::ConversionApi;
use crate::error::AppError;
use crate::models::conversion::{
    ApiErrorBody, ConversionKind, ConvertResponse, VideoCompressionSettings,
};
use crate::models::file::FileEntry;
use crate::services::upload_queue::format_bytes;

const USER_AGENT: &str = "MediaConvert/0.1.0";
const IMAGE_ENDPOINT: &str = "/api/convert";
const VIDEO_ENDPOINT: &str = "/api/convert-video";
const HEALTH_ENDPOINT: &str = "/health";
const HEALTH_TIMEOUT_SECS: u64 = 5;

pub struct ConversionApiV1 {
    client: reqwest::Client,
    base_url: String,
}

impl ConversionApiV1 {
    pub fn new(base_url: &str, timeout_secs: u64) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn file_part(entry: &FileEntry) -> crate::error::Result<Part> {
        let data = tokio::fs::read(&entry.file_path).await?;
        Part::bytes(data)
            .file_name(entry.file_name.clone())
            .mime_str(&entry.mime_type)
            .map_err(|e| AppError::Internal(format!("MIME parse error: {}", e)))
    }

    async fn post_convert(
        &self,
        endpoint: &str,
        form: Form,
        kind: ConversionKind,
        file_size: u64,
    ) -> crate::error::Result<ConvertResponse> {
        let url = format!("{}{}", self.base_url, endpoint);
        log::info!("Sending {} conversion request to {} ({} bytes)", kind, url, file_size);

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(&e, &self.base_url))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| network_error(&e, &self.base_url))?;
        log::info!("Response received: {}", status);

        if !status.is_success() {
            log::error!("Request failed: status={}, body={}", status, body);
            return Err(translate_error(status, &body, kind));
        }

        let parsed: ConvertResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Api(format!("Unexpected response from server: {}", e)))?;
        if !parsed.success {
            return Err(AppError::Api(parsed.message));
        }
        Ok(parsed)
    }
}

impl ConversionApi for ConversionApiV1 {
    async fn convert_image(&self, entry: &FileEntry) -> crate::error::Result<ConvertResponse> {
        if !entry.mime_type.contains("png") {
            return Err(AppError::Validation("Only PNG files are supported".into()));
        }
        let form = Form::new().part("image", Self::file_part(entry).await?);
        self.post_convert(IMAGE_ENDPOINT, form, ConversionKind::Image, entry.file_size)
            .await
    }

    async fn convert_video(
        &self,
        entry: &FileEntry,
        settings: &VideoCompressionSettings,
    ) -> crate::error::Result<ConvertResponse> {
        if !entry.mime_type.contains("mp4") {
            return Err(AppError::Validation("Only MP4 files are supported".into()));
        }
        let form = Form::new()
            .part("video", Self::file_part(entry).await?)
            .text("quality", settings.quality.as_str())
            .text("audio_bitrate", settings.audio_bitrate.as_str());
        self.post_convert(VIDEO_ENDPOINT, form, ConversionKind::Video, entry.file_size)
            .await
    }

    async fn check_health(&self) -> bool {
        let url = format!("{}{}", self.base_url, HEALTH_ENDPOINT);
        let resp = match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::warn!("Health check returned {}", r.status());
                return false;
            }
            Err(e) => {
                log::warn!("Health check failed: {}", e);
                return false;
            }
        };
        match resp.json::<serde_json::Value>().await {
            Ok(body) => body["status"].as_str() == Some("healthy"),
            Err(_) => false,
        }
    }
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Failure before any HTTP response arrived (refused, DNS, timeout).
fn network_error(err: &reqwest::Error, base_url: &str) -> AppError {
    log::error!("Request failed: {}", err);
    AppError::Network(format!(
        "{}. Check if backend is running on {}",
        err, base_url
    ))
}

/// Translate an HTTP error response into a user-facing error.
///
/// A structured backend error body wins; otherwise the status code decides.
pub(crate) fn translate_error(status: StatusCode, body: &str, kind: ConversionKind) -> AppError {
    if let Ok(err_body) = serde_json::from_str::<ApiErrorBody>(body) {
        if !err_body.success {
            return AppError::Api(err_body.error);
        }
    }
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::Api(format!(
            "File size too large. Maximum allowed size is {}.",
            format_bytes(kind.max_size(), 0).replace(' ', "")
        ));
    }
    if status.is_server_error() {
        return AppError::Api("Server error occurred. Please try again later.".into());
    }
    AppError::Api(format!("Request failed with status code {}", status.as_u16()))
}
