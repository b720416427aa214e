//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Silo configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config parses, applies env overrides and validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Landing Dir: {}", config.landing.base_dir);
        println!("  Poll Interval: {}ms", config.landing.poll_interval_ms);
        println!("  Queue Capacity: {}", config.landing.queue_capacity);
        println!("  Staging Dir: {}", config.staging.base_dir);
        println!("  Quarantine Dir: {}", config.quarantine.dir);
        println!("  State Dir: {}", config.state.dir);
        if let Some(ref dictionary) = config.cipher.dictionary_path {
            println!("  Cipher Dictionary: {dictionary}");
        }
        if let Some(ref recipient) = config.notify.recipient {
            println!("  Notify Recipient: {recipient}");
        }
        println!("  Entities:");
        for entity in &config.entities {
            println!(
                "    {} (cursor: {} [{}], columns: {}{})",
                entity.name,
                entity.cursor_column,
                match entity.cursor_mode {
                    crate::config::CursorMode::Watermark => "watermark",
                    crate::config::CursorMode::SeenSet => "seen_set",
                },
                entity.columns.len(),
                entity
                    .cipher_column
                    .as_deref()
                    .map(|c| format!(", cipher: {c}"))
                    .unwrap_or_default()
            );
        }
        println!();
        Ok(0)
    }
}
