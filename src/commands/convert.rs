use std::path::PathBuf;
use std::sync::atomic::Ordering;

use clap::Args;

use super::files::resolve_dropped_paths;
use super::AppContext;
use crate::api::v1::ConversionApiV1;
use crate::models::conversion::{AudioBitrate, CompressionQuality, ConversionKind};
use crate::services::batch::{download_completed, BatchConverter, BatchEvent, BatchSummary};
use crate::services::upload_queue::{format_bytes, UploadOptions, UploadQueue};
use crate::storage::history::ConversionHistory;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// What to convert: `image` (PNG -> WebP) or `video` (MP4 -> WebM)
    pub kind: ConversionKind,

    /// Files or directories to queue
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Video compression level: maximum, high, balanced, low, minimal
    #[arg(long)]
    pub quality: Option<CompressionQuality>,

    /// Video audio bitrate: 32k, 64k, 96k, 128k, 192k
    #[arg(long)]
    pub audio_bitrate: Option<AudioBitrate>,

    /// Directory the converted files are written to
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Only record results in the history, do not write output files
    #[arg(long)]
    pub no_save: bool,
}

pub async fn convert(ctx: &AppContext, args: ConvertArgs) -> Result<(), String> {
    let kind = args.kind;
    let mut video = ctx.settings.video;
    if let Some(quality) = args.quality {
        video.quality = quality;
    }
    if let Some(bitrate) = args.audio_bitrate {
        video.audio_bitrate = bitrate;
    }

    let entries = resolve_dropped_paths(args.paths)
        .await
        .map_err(|e| e.to_string())?;
    let mut queue = UploadQueue::new(UploadOptions::for_kind(kind));
    queue.add_files(entries);
    for err in queue.errors() {
        eprintln!("skipped: {}", err);
    }
    if queue.is_empty() {
        return Err("No files to convert".to_string());
    }

    let api = ConversionApiV1::new(&ctx.settings.api_base_url, ctx.settings.timeout_secs)
        .map_err(|e| e.to_string())?;
    let mut history =
        ConversionHistory::open(&ctx.data_dir, kind).map_err(|e| e.to_string())?;
    let mut converter = BatchConverter::new(api, kind).with_video_settings(video);
    if kind == ConversionKind::Video {
        println!(
            "{} ({}), audio {}",
            video.quality.label(),
            video.quality.estimated_reduction(),
            video.audio_bitrate
        );
    }

    let mut events = converter.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event);
        }
    });

    let cancel = converter.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; stopping after the current file");
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let result = converter.convert_all(&mut queue, &mut history).await;
    interrupt.abort();
    drop(converter);
    let _ = printer.await;
    let summary = result.map_err(|e| e.to_string())?;

    if !args.no_save {
        let written = download_completed(&queue, &args.out).map_err(|e| e.to_string())?;
        for path in written {
            println!("saved {}", path.display());
        }
    }

    finish(&summary)
}

fn print_event(event: &BatchEvent) {
    match event {
        BatchEvent::Started { total } => println!("Converting {} file(s)...", total),
        BatchEvent::ItemStarted {
            file_name,
            index,
            total,
            ..
        } => println!("[{}/{}] {}", index + 1, total, file_name),
        BatchEvent::ItemCompleted { response, .. } => println!(
            "  done: {} ({} -> {}, {:.1}% saved)",
            response.filename,
            format_bytes(response.original_size, 2),
            format_bytes(response.converted_size, 2),
            response.compression_ratio
        ),
        BatchEvent::ItemFailed { error, .. } => println!("  failed: {}", error),
        BatchEvent::Progress { .. } | BatchEvent::Finished(_) => {}
    }
}

fn finish(summary: &BatchSummary) -> Result<(), String> {
    println!(
        "{} converted, {} failed, {} cancelled",
        summary.completed, summary.failed, summary.cancelled
    );
    if summary.failed > 0 {
        Err(format!("{} file(s) failed to convert", summary.failed))
    } else if summary.cancelled > 0 {
        Err("Conversion cancelled".to_string())
    } else {
        Ok(())
    }
}
