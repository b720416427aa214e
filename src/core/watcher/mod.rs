//! Landing area watcher
//!
//! Two cooperating loops connected by a bounded work queue:
//!
//! - the scan loop polls the current hour's landing partition
//!   (`<base>/<YYYY-MM-DD>/<HH>`) and enqueues paths it hasn't seen this
//!   hour; the bounded queue applies backpressure when processing lags
//! - the drain loop pulls paths off the queue, runs the orchestrator, and
//!   deletes the source file once it has been consumed
//!
//! The seen-set resets on the hour boundary, matching how the landing area
//! is partitioned: a producer never writes to a past hour, so state about
//! past hours is dead weight. Cross-restart dedup is the cursor store's job,
//! not the watcher's.

use crate::config::LandingConfig;
use crate::core::pipeline::{FileOutcome, Orchestrator};
use crate::domain::result::Result;
use chrono::{DateTime, Local, NaiveDate, Timelike};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Scan loop state: where to look and what was already enqueued this hour
#[derive(Debug)]
pub struct Scanner {
    base_dir: PathBuf,
    seen: HashSet<PathBuf>,
    target: Option<(NaiveDate, u32)>,
}

impl Scanner {
    /// Creates a scanner over the landing base directory
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            seen: HashSet::new(),
            target: None,
        }
    }

    /// Landing partition for the given instant
    pub fn partition_dir(&self, now: DateTime<Local>) -> PathBuf {
        self.base_dir
            .join(now.date_naive().format("%Y-%m-%d").to_string())
            .join(format!("{:02}", now.hour()))
    }

    /// Scans the current hour's partition once, returning newly seen files
    ///
    /// Crossing an hour boundary clears the seen-set before scanning. A
    /// partition directory that doesn't exist yet yields no files.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing partition directory is unreadable.
    pub fn scan(&mut self, now: DateTime<Local>) -> Result<Vec<PathBuf>> {
        let target = (now.date_naive(), now.hour());
        if self.target != Some(target) {
            if self.target.is_some() {
                tracing::debug!(
                    date = %target.0,
                    hour = target.1,
                    "Hour rolled over, clearing seen files"
                );
            }
            self.seen.clear();
            self.target = Some(target);
        }

        let dir = self.partition_dir(now);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut discovered = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && self.seen.insert(path.clone()) {
                discovered.push(path);
            }
        }
        discovered.sort();
        Ok(discovered)
    }
}

/// Runs the scan loop until shutdown is signalled
///
/// Newly discovered paths are pushed onto the bounded queue; a full queue
/// blocks the send and thereby pauses scanning.
pub async fn scan_loop(
    mut scanner: Scanner,
    config: LandingConfig,
    queue: mpsc::Sender<PathBuf>,
    mut shutdown: watch::Receiver<bool>,
) {
    let interval = Duration::from_millis(config.poll_interval_ms);
    loop {
        match scanner.scan(Local::now()) {
            Ok(paths) => {
                for path in paths {
                    tracing::info!(file = %path.display(), "Discovered landing file");
                    if queue.send(path).await.is_err() {
                        tracing::debug!("Work queue closed, stopping scan loop");
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan landing partition");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("Shutdown signalled, stopping scan loop");
                    return;
                }
            }
        }
    }
}

/// Runs the drain loop until the queue closes or shutdown is signalled
///
/// Each dequeued file runs through the orchestrator; whatever remains at the
/// source path afterwards is deleted, since its content is now either in
/// staging, already ingested, or in quarantine.
pub async fn drain_loop(
    mut orchestrator: Orchestrator,
    mut queue: mpsc::Receiver<PathBuf>,
    mut shutdown: watch::Receiver<bool>,
) -> Orchestrator {
    loop {
        let path = tokio::select! {
            path = queue.recv() => match path {
                Some(path) => path,
                None => {
                    tracing::debug!("Work queue closed, stopping drain loop");
                    return orchestrator;
                }
            },
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("Shutdown signalled, stopping drain loop");
                    return orchestrator;
                }
                continue;
            }
        };

        match orchestrator.process(&path) {
            Ok(outcome) => {
                if let FileOutcome::Loaded { rows, .. } = &outcome {
                    tracing::info!(file = %path.display(), rows, "File ingested");
                }
                consume_source(&path);
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "Failed to contain file failure");
            }
        }
    }
}

fn consume_source(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(file = %path.display(), error = %e, "Failed to delete consumed file");
        }
    }
}

/// Wires the scan and drain loops together and runs until shutdown
///
/// This is the long-running service behind `silo run`.
pub async fn run(
    orchestrator: Orchestrator,
    config: LandingConfig,
    shutdown: watch::Receiver<bool>,
) -> Orchestrator {
    let scanner = Scanner::new(&config.base_dir);
    let (tx, rx) = mpsc::channel(config.queue_capacity);

    let scan = tokio::spawn(scan_loop(scanner, config, tx, shutdown.clone()));
    let orchestrator = drain_loop(orchestrator, rx, shutdown).await;
    scan.abort();
    orchestrator
}
