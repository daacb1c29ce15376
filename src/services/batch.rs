//! Batch converter — converts every queued file one after another.
//!
//! Items are processed strictly in queue order. A failing item is marked and
//! the batch moves on. Progress is published to subscribers as `BatchEvent`s.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::ConversionApi;
use crate::error::AppError;
use crate::models::conversion::{ConversionKind, ConvertResponse, VideoCompressionSettings};
use crate::models::upload::UploadStatus;
use crate::services::upload_queue::UploadQueue;
use crate::storage::history::{write_converted, ConversionHistory};

/// Progress shown while an item's request is in flight.
pub const IN_FLIGHT_PROGRESS: u8 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub failed: usize,
    /// Items left pending because the batch was cancelled.
    pub cancelled: usize,
}

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    ItemStarted {
        id: String,
        file_name: String,
        index: usize,
        total: usize,
    },
    ItemCompleted {
        id: String,
        file_name: String,
        response: ConvertResponse,
    },
    ItemFailed {
        id: String,
        file_name: String,
        error: String,
    },
    Progress {
        completed: usize,
        total: usize,
        percent: f64,
    },
    Finished(BatchSummary),
}

pub struct BatchConverter<A: ConversionApi> {
    api: A,
    kind: ConversionKind,
    video_settings: VideoCompressionSettings,
    converting: AtomicBool,
    cancel_flag: Arc<AtomicBool>,
    /// f64 bits of the global progress percentage.
    global_progress: AtomicU64,
    subscribers: Vec<UnboundedSender<BatchEvent>>,
}

impl<A: ConversionApi> BatchConverter<A> {
    pub fn new(api: A, kind: ConversionKind) -> Self {
        Self {
            api,
            kind,
            video_settings: VideoCompressionSettings::default(),
            converting: AtomicBool::new(false),
            cancel_flag: Arc::new(AtomicBool::new(false)),
            global_progress: AtomicU64::new(0f64.to_bits()),
            subscribers: Vec::new(),
        }
    }

    pub fn with_video_settings(mut self, settings: VideoCompressionSettings) -> Self {
        self.video_settings = settings;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn kind(&self) -> ConversionKind {
        self.kind
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<BatchEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn is_converting(&self) -> bool {
        self.converting.load(Ordering::Acquire)
    }

    /// Percentage of the running batch that has been processed (0 when idle).
    pub fn global_progress(&self) -> f64 {
        f64::from_bits(self.global_progress.load(Ordering::Relaxed))
    }

    /// Shared flag that stops the batch before its next item when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel_flag.clone()
    }

    /// Convert every queued file in order, recording successes in `history`.
    ///
    /// An empty queue is a no-op. Fails only when another batch is already
    /// running on this converter; per-item failures are stored on the items.
    pub async fn convert_all(
        &self,
        queue: &mut UploadQueue,
        history: &mut ConversionHistory,
    ) -> crate::error::Result<BatchSummary> {
        if queue.is_empty() {
            return Ok(BatchSummary::default());
        }
        if self.converting.swap(true, Ordering::AcqRel) {
            return Err(AppError::Validation(
                "A conversion batch is already running".into(),
            ));
        }
        self.cancel_flag.store(false, Ordering::Relaxed);
        self.set_global_progress(0.0);

        let mut guard = RunGuard {
            converting: &self.converting,
            global_progress: &self.global_progress,
            queue,
        };
        let summary = self.run(&mut *guard.queue, history).await;
        drop(guard);

        log::info!(
            "Batch finished: completed={}, failed={}, cancelled={}",
            summary.completed,
            summary.failed,
            summary.cancelled
        );
        self.publish(BatchEvent::Finished(summary.clone()));
        Ok(summary)
    }

    async fn run(&self, queue: &mut UploadQueue, history: &mut ConversionHistory) -> BatchSummary {
        for item in queue.items_mut() {
            item.status = UploadStatus::Uploading;
            item.progress = 0;
            item.error = None;
        }

        let ids: Vec<String> = queue.files().iter().map(|f| f.id.clone()).collect();
        let total = ids.len();
        let mut summary = BatchSummary::default();
        self.publish(BatchEvent::Started { total });

        for (index, id) in ids.iter().enumerate() {
            if self.cancel_flag.load(Ordering::Relaxed) {
                for rest in &ids[index..] {
                    if let Some(item) = queue.item_mut(rest) {
                        item.status = UploadStatus::Pending;
                        item.progress = 0;
                    }
                }
                summary.cancelled = total - index;
                log::warn!("Batch cancelled with {} item(s) remaining", summary.cancelled);
                break;
            }

            let entry = match queue.item_mut(id) {
                Some(item) => {
                    item.status = UploadStatus::Uploading;
                    item.progress = IN_FLIGHT_PROGRESS;
                    item.entry.clone()
                }
                None => continue,
            };
            self.publish(BatchEvent::ItemStarted {
                id: id.clone(),
                file_name: entry.file_name.clone(),
                index,
                total,
            });

            let result = match self.kind {
                ConversionKind::Image => self.api.convert_image(&entry).await,
                ConversionKind::Video => {
                    self.api.convert_video(&entry, &self.video_settings).await
                }
            };

            match result {
                Ok(response) => {
                    if let Some(item) = queue.item_mut(id) {
                        item.status = UploadStatus::Completed;
                        item.progress = 100;
                        item.result = Some(response.clone());
                    }
                    history.add(&response);
                    summary.completed += 1;
                    log::info!(
                        "Converted {} -> {} ({:.1}% saved)",
                        entry.file_name,
                        response.filename,
                        response.compression_ratio
                    );
                    self.publish(BatchEvent::ItemCompleted {
                        id: id.clone(),
                        file_name: entry.file_name.clone(),
                        response,
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    if let Some(item) = queue.item_mut(id) {
                        item.status = UploadStatus::Error;
                        item.progress = 0;
                        item.error = Some(message.clone());
                    }
                    summary.failed += 1;
                    log::error!("Conversion failed for '{}': {}", entry.file_name, message);
                    self.publish(BatchEvent::ItemFailed {
                        id: id.clone(),
                        file_name: entry.file_name.clone(),
                        error: message,
                    });
                }
            }

            let percent = (index + 1) as f64 / total as f64 * 100.0;
            self.set_global_progress(percent);
            self.publish(BatchEvent::Progress {
                completed: index + 1,
                total,
                percent,
            });
        }

        summary
    }

    fn set_global_progress(&self, percent: f64) {
        self.global_progress
            .store(percent.to_bits(), Ordering::Relaxed);
    }

    fn publish(&self, event: BatchEvent) {
        for tx in &self.subscribers {
            let _ = tx.send(event.clone());
        }
    }
}

/// Clears the running state when `convert_all` ends, including when its
/// future is dropped mid-batch. Items left in flight go back to Pending.
struct RunGuard<'a> {
    converting: &'a AtomicBool,
    global_progress: &'a AtomicU64,
    queue: &'a mut UploadQueue,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        for item in self.queue.items_mut() {
            if item.status == UploadStatus::Uploading {
                item.status = UploadStatus::Pending;
                item.progress = 0;
            }
        }
        self.global_progress.store(0f64.to_bits(), Ordering::Relaxed);
        self.converting.store(false, Ordering::Release);
    }
}

/// Write every completed item's converted output into `dir`.
pub fn download_completed(queue: &UploadQueue, dir: &Path) -> crate::error::Result<Vec<PathBuf>> {
    queue
        .completed()
        .into_iter()
        .filter_map(|item| item.result.as_ref())
        .map(|result| write_converted(&result.filename, &result.webp_data, dir))
        .collect()
}
