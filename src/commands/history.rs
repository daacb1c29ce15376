use std::path::PathBuf;

use clap::Subcommand;

use super::AppContext;
use crate::models::conversion::ConversionKind;
use crate::services::upload_queue::format_bytes;
use crate::storage::history::ConversionHistory;

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List records, newest first
    List {
        #[arg(long, default_value = "image")]
        kind: ConversionKind,
    },
    /// Remove records by ID
    Remove {
        #[arg(long, default_value = "image")]
        kind: ConversionKind,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Remove every record
    Clear {
        #[arg(long, default_value = "image")]
        kind: ConversionKind,
    },
    /// Write converted files from the history to disk
    Download {
        #[arg(long, default_value = "image")]
        kind: ConversionKind,
        /// Record IDs to download
        #[arg(required_unless_present = "all")]
        ids: Vec<String>,
        /// Download every record
        #[arg(long, conflicts_with = "ids")]
        all: bool,
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

pub fn history(ctx: &AppContext, action: HistoryAction) -> Result<(), String> {
    match action {
        HistoryAction::List { kind } => {
            let history = open(ctx, kind)?;
            println!("Conversion History ({})", history.len());
            for record in history.records() {
                println!(
                    "{}  {}  {} -> {}  {:.1}%  {}",
                    record.id,
                    record.filename,
                    format_bytes(record.original_size, 2),
                    format_bytes(record.converted_size, 2),
                    record.compression_ratio,
                    record.timestamp.format("%Y-%m-%d %H:%M:%S")
                );
            }
            Ok(())
        }
        HistoryAction::Remove { kind, ids } => {
            let mut history = open(ctx, kind)?;
            let before = history.len();
            history.remove_many(&ids);
            println!("Removed {} record(s)", before - history.len());
            Ok(())
        }
        HistoryAction::Clear { kind } => {
            let mut history = open(ctx, kind)?;
            history.clear();
            println!("History cleared");
            Ok(())
        }
        HistoryAction::Download {
            kind,
            ids,
            all,
            out,
        } => {
            let mut history = open(ctx, kind)?;
            if all {
                history.select_all();
            } else {
                for id in &ids {
                    if history.get(id).is_none() {
                        return Err(format!("No history record with id: {}", id));
                    }
                    if !history.is_selected(id) {
                        history.toggle_selection(id);
                    }
                }
            }
            let written = history
                .download_many(&history.selected(), &out)
                .map_err(|e| e.to_string())?;
            for path in written {
                println!("saved {}", path.display());
            }
            Ok(())
        }
    }
}

fn open(ctx: &AppContext, kind: ConversionKind) -> Result<ConversionHistory, String> {
    ConversionHistory::open(&ctx.data_dir, kind).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversion::ConvertResponse;

    fn ctx(dir: &std::path::Path) -> AppContext {
        AppContext {
            data_dir: dir.to_path_buf(),
            settings: Default::default(),
        }
    }

    fn seed(dir: &std::path::Path, names: &[&str]) -> Vec<String> {
        let mut history = ConversionHistory::open(dir, ConversionKind::Image).unwrap();
        names
            .iter()
            .map(|n| {
                history
                    .add(&ConvertResponse {
                        success: true,
                        message: "ok".to_string(),
                        filename: n.to_string(),
                        webp_data: "aGk=".to_string(),
                        original_size: 10,
                        converted_size: 2,
                        compression_ratio: 80.0,
                    })
                    .id
            })
            .collect()
    }

    #[test]
    fn remove_deletes_persisted_records() {
        let dir = tempfile::tempdir().unwrap();
        let ids = seed(dir.path(), &["a.webp", "b.webp"]);
        history(
            &ctx(dir.path()),
            HistoryAction::Remove {
                kind: ConversionKind::Image,
                ids: vec![ids[0].clone()],
            },
        )
        .unwrap();
        let reloaded = ConversionHistory::open(dir.path(), ConversionKind::Image).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.records()[0].filename, "b.webp");
    }

    #[test]
    fn download_all_writes_every_record() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &["a.webp", "b.webp"]);
        let out = dir.path().join("out");
        history(
            &ctx(dir.path()),
            HistoryAction::Download {
                kind: ConversionKind::Image,
                ids: vec![],
                all: true,
                out: out.clone(),
            },
        )
        .unwrap();
        assert_eq!(std::fs::read(out.join("a.webp")).unwrap(), b"hi");
        assert!(out.join("b.webp").exists());
    }

    #[test]
    fn download_unknown_id_errors() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &["a.webp"]);
        let err = history(
            &ctx(dir.path()),
            HistoryAction::Download {
                kind: ConversionKind::Image,
                ids: vec!["missing".to_string()],
                all: false,
                out: dir.path().to_path_buf(),
            },
        )
        .unwrap_err();
        assert!(err.contains("missing"));
    }

    #[test]
    fn clear_empties_history() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &["a.webp"]);
        history(
            &ctx(dir.path()),
            HistoryAction::Clear {
                kind: ConversionKind::Image,
            },
        )
        .unwrap();
        assert!(ConversionHistory::open(dir.path(), ConversionKind::Image)
            .unwrap()
            .is_empty());
    }
}
