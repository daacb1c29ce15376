use clap::Subcommand;

use super::AppContext;
use crate::models::conversion::{AudioBitrate, CompressionQuality, VideoCompressionSettings};
use crate::models::settings::AppSettings;
use crate::storage::settings;

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the saved settings
    Show,
    /// Set the backend base URL
    SetUrl { url: String },
    /// Set the request timeout in seconds
    SetTimeout { secs: u64 },
    /// Set the default video compression level
    SetQuality { quality: CompressionQuality },
    /// Set the default video audio bitrate
    SetAudio { bitrate: AudioBitrate },
    /// Restore the default video compression settings
    ResetVideo,
}

pub fn settings(ctx: &AppContext, action: SettingsAction) -> Result<(), String> {
    // Work on the saved copy so command-line overrides are never persisted.
    let mut saved = settings::get_settings(&ctx.data_dir).map_err(|e| e.to_string())?;
    match action {
        SettingsAction::Show => {
            print_settings(&ctx.settings);
            return Ok(());
        }
        SettingsAction::SetUrl { url } => saved.api_base_url = url,
        SettingsAction::SetTimeout { secs } => {
            if secs == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
            saved.timeout_secs = secs;
        }
        SettingsAction::SetQuality { quality } => saved.video.quality = quality,
        SettingsAction::SetAudio { bitrate } => saved.video.audio_bitrate = bitrate,
        SettingsAction::ResetVideo => saved.video = VideoCompressionSettings::default(),
    }
    settings::save_settings(&ctx.data_dir, &saved).map_err(|e| e.to_string())?;
    print_settings(&saved);
    Ok(())
}

fn print_settings(s: &AppSettings) {
    println!("backend:  {}", s.api_base_url);
    println!("timeout:  {}s", s.timeout_secs);
    println!(
        "quality:  {} - {} ({}, {})",
        s.video.quality.label(),
        s.video.quality.description(),
        s.video.quality.estimated_reduction(),
        s.video.quality.speed()
    );
    println!("audio:    {}", s.video.audio_bitrate.label());
}
