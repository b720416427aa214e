//! Ingest command implementation
//!
//! This module implements the `ingest` command for running a single file
//! through the pipeline without starting the watcher.

use crate::config::load_config;
use crate::core::pipeline::{FileOutcome, Orchestrator};
use clap::Args;
use std::path::Path;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Path of the file to ingest
    pub file: String,

    /// Keep the source file after a successful ingest
    #[arg(long)]
    pub keep: bool,
}

impl IngestArgs {
    /// Execute the ingest command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file, "Ingesting single file");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let path = Path::new(&self.file);
        if !path.exists() {
            eprintln!("File not found: {}", self.file);
            return Ok(2);
        }

        let mut orchestrator = match Orchestrator::new(config) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Failed to initialize pipeline: {e}");
                return Ok(4); // Setup error exit code
            }
        };

        let outcome = match orchestrator.process(path) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Ingest failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        if should_consume(&outcome, self.keep) && path.exists() {
            std::fs::remove_file(path)?;
        }
        let exit_code = match &outcome {
            FileOutcome::Loaded { rows, staging_path } => {
                println!("✅ Loaded {} row(s) to {}", rows, staging_path.display());
                0
            }
            FileOutcome::SkippedNoNewRows => {
                println!("⏭️  No new rows, nothing loaded");
                0
            }
            FileOutcome::Quarantined { reason } => {
                println!("❌ File quarantined: {reason}");
                1 // Partial failure
            }
        };

        orchestrator.shutdown().await;
        Ok(exit_code)
    }
}

/// Whether the source file is consumed after processing
///
/// Loaded and skipped files are consumed like the watcher's drain loop does;
/// quarantined files have already been moved. `--keep` leaves the source in
/// place.
fn should_consume(outcome: &FileOutcome, keep: bool) -> bool {
    !keep
        && matches!(
            outcome,
            FileOutcome::Loaded { .. } | FileOutcome::SkippedNoNewRows
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_ingest_args() {
        let args = IngestArgs {
            file: "/data/loans_1.csv".to_string(),
            keep: true,
        };
        assert_eq!(args.file, "/data/loans_1.csv");
        assert!(args.keep);
    }

    #[test]
    fn test_skipped_file_is_consumed_like_loaded() {
        let loaded = FileOutcome::Loaded {
            rows: 1,
            staging_path: PathBuf::from("/stage/loans/loans_1.jsonl"),
        };
        assert!(should_consume(&loaded, false));
        assert!(should_consume(&FileOutcome::SkippedNoNewRows, false));
    }

    #[test]
    fn test_keep_leaves_source_in_place() {
        assert!(!should_consume(&FileOutcome::SkippedNoNewRows, true));
    }

    #[test]
    fn test_quarantined_source_already_moved() {
        let quarantined = FileOutcome::Quarantined {
            reason: "unknown entity".to_string(),
        };
        assert!(!should_consume(&quarantined, false));
    }
}
