//! Conversion backend API abstraction layer.
//!
//! `ConversionApi` is the only interface for HTTP interactions with the
//! conversion backend. All network requests MUST be implemented within the
//! `api/` directory; `services/` and `commands/` call through this trait and
//! never construct HTTP requests directly.

use crate::error::AppError;
use crate::models::conversion::{ConvertResponse, VideoCompressionSettings};
use crate::models::file::FileEntry;

/// Abstraction trait for the conversion backend.
///
/// The current implementation is `ConversionApiV1`. Tests swap in an
/// in-memory fake.
pub trait ConversionApi: Send + Sync {
    /// Convert a PNG image to WebP.
    ///
    /// Non-PNG input is rejected locally without a request.
    fn convert_image(
        &self,
        entry: &FileEntry,
    ) -> impl std::future::Future<Output = std::result::Result<ConvertResponse, AppError>> + Send;

    /// Convert an MP4 video to WebM with the given compression settings.
    fn convert_video(
        &self,
        entry: &FileEntry,
        settings: &VideoCompressionSettings,
    ) -> impl std::future::Future<Output = std::result::Result<ConvertResponse, AppError>> + Send;

    /// Whether the backend reports itself healthy.
    ///
    /// Unreachable or unhealthy backends yield `false`; this is never an error.
    fn check_health(&self) -> impl std::future::Future<Output = bool> + Send;
}

pub mod v1;
