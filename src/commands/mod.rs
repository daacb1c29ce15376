//! Command-line front-end.
//!
//! Command handlers parse arguments and forward to the `services` and
//! `storage` layers. They hold no business logic and report failures as
//! user-facing strings.

pub mod convert;
pub mod files;
pub mod health;
pub mod history;
pub mod settings;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::models::settings::AppSettings;
use crate::storage;

#[derive(Debug, Parser)]
#[command(
    name = "media-convert",
    version,
    about = "Convert PNG to WebP and MP4 to WebM through the conversion service"
)]
pub struct Cli {
    /// Base URL of the conversion backend (overrides the saved setting)
    #[arg(long, global = true, env = "MEDIA_CONVERT_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding history.json and settings.json
    #[arg(long, global = true, env = "MEDIA_CONVERT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Queue files and convert them one after another
    Convert(convert::ConvertArgs),
    /// Inspect and manage the conversion history
    History {
        #[command(subcommand)]
        action: history::HistoryAction,
    },
    /// Check whether the backend is reachable and healthy
    Health,
    /// Show or change saved settings
    Settings {
        #[command(subcommand)]
        action: settings::SettingsAction,
    },
}

/// Resolved runtime context shared by all handlers.
pub struct AppContext {
    pub data_dir: PathBuf,
    /// Saved settings with command-line overrides applied.
    pub settings: AppSettings,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self, String> {
        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(storage::default_data_dir);
        let mut settings =
            storage::settings::get_settings(&data_dir).map_err(|e| e.to_string())?;
        if let Some(url) = &cli.api_url {
            settings.api_base_url = url.clone();
        }
        log::debug!(
            "Using data dir {} and backend {}",
            data_dir.display(),
            settings.api_base_url
        );
        Ok(Self { data_dir, settings })
    }
}

pub async fn dispatch(cli: Cli) -> Result<(), String> {
    let ctx = AppContext::from_cli(&cli)?;
    match cli.command {
        Command::Convert(args) => convert::convert(&ctx, args).await,
        Command::History { action } => history::history(&ctx, action),
        Command::Health => health::check_health(&ctx).await,
        Command::Settings { action } => settings::settings(&ctx, action),
    }
}
