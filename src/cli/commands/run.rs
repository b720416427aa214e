//! Run command implementation
//!
//! This module implements the `run` command: the long-running watcher
//! service over the hour-partitioned landing area.

use crate::config::load_config;
use crate::core::pipeline::Orchestrator;
use crate::core::watcher;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the landing base directory
    #[arg(long)]
    pub landing_dir: Option<String>,

    /// Override the poll interval in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting watcher service");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if let Some(ref dir) = self.landing_dir {
            tracing::info!(landing_dir = %dir, "Overriding landing directory from CLI");
            config.landing.base_dir = dir.clone();
        }
        if let Some(interval) = self.poll_interval_ms {
            tracing::info!(poll_interval_ms = interval, "Overriding poll interval from CLI");
            config.landing.poll_interval_ms = interval;
        }
        if let Err(e) = config.validate() {
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let landing = config.landing.clone();
        let orchestrator = match Orchestrator::new(config) {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create orchestrator");
                eprintln!("Failed to initialize pipeline: {e}");
                return Ok(4); // Setup error exit code
            }
        };

        println!("👀 Watching {} (Ctrl+C to stop)", landing.base_dir);
        println!();

        let orchestrator = watcher::run(orchestrator, landing, shutdown_signal).await;
        orchestrator.shutdown().await;

        println!();
        println!("✅ Watcher stopped cleanly");
        Ok(0)
    }
}
