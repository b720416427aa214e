//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "silo.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Silo configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your directories", self.output);
                println!("  2. Declare one [[entities]] block per expected feed");
                println!("  3. Validate configuration: silo validate-config");
                println!("  4. Start the watcher: silo run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Silo Configuration File
# Incremental file ingestion engine

[application]
log_level = "info"

[landing]
base_dir = "/data/incoming"
poll_interval_ms = 1000
queue_capacity = 256

[staging]
base_dir = "/data/staging"

[quarantine]
dir = "/data/failed_files"

[state]
dir = "/var/lib/silo/state"

[extract]
txt_delimiter = "|"

[cipher]
dictionary_path = "support/english_words.txt"

[notify]
recipient = "ops@example.com"

[logging]
local_enabled = false
local_path = "/var/log/silo"
local_rotation = "daily"

[[entities]]
name = "loans"
cursor_column = "utilization_date"
cursor_mode = "watermark"
cipher_column = "loan_reason"

[entities.columns]
customer_id = "str"
loan_type = "str"
amount_utilized = "float"
utilization_date = "datetime"
loan_reason = "str"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Silo Configuration File
# Incremental file ingestion engine
#
# Producers drop files into the hour-partitioned landing area:
#   <landing.base_dir>/<YYYY-MM-DD>/<HH>/<entity>_<timestamp>.<csv|txt|json>
# Silo watches the current hour, runs each file through
# extract -> validate -> cursor-filter -> transform -> load,
# and writes the surviving rows to staging as JSON Lines.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Landing Area
# ============================================================================
[landing]
# Base directory producers drop files into
base_dir = "/data/incoming"

# Idle sleep for both polling loops, in milliseconds
poll_interval_ms = 1000

# Work queue depth; scanning pauses when the queue is full
queue_capacity = 256

# ============================================================================
# Staging Destination
# ============================================================================
[staging]
# Loaded batches land at <base_dir>/<entity>/<file-stem>.jsonl
base_dir = "/data/staging"

# ============================================================================
# Quarantine
# ============================================================================
[quarantine]
# Flat directory failed source files are moved into, keeping their name
dir = "/data/failed_files"

# ============================================================================
# Cursor State
# ============================================================================
[state]
# One JSON cursor document per entity is persisted here
dir = "/var/lib/silo/state"

# ============================================================================
# Extraction
# ============================================================================
[extract]
# Field delimiter for .txt files (.csv is always comma)
txt_delimiter = "|"

# ============================================================================
# Cipher Engine
# ============================================================================
[cipher]
# Word list backing ciphertext-only key recovery; required when any
# entity declares a cipher_column
dictionary_path = "support/english_words.txt"

# ============================================================================
# Failure Notifications
# ============================================================================
[notify]
# Recipient passed to the notifier when a file is quarantined
recipient = "ops@example.com"

# ============================================================================
# Logging
# ============================================================================
[logging]
# Enable rolling file output in addition to the console
local_enabled = false

# Directory for rolling log files
local_path = "/var/log/silo"

# Rotation cadence: "daily" or "hourly"
local_rotation = "daily"

# ============================================================================
# Entities
# One [[entities]] block per expected feed. The entity name is matched
# against the landing filename stem minus its trailing _<timestamp>.
# ============================================================================
[[entities]]
name = "loans"

# Column the incremental cursor tracks
cursor_column = "utilization_date"

# Cursor shape: "watermark" (scalar high-water mark, rows must be
# strictly greater) or "seen_set" (dedup set of every value ingested)
cursor_mode = "watermark"

# Optional free-text column obfuscated during transform
cipher_column = "loan_reason"

# Declared columns and types: str | int | float | datetime.
# datetime columns are coerced to canonical YYYY-MM-DD during validation.
[entities.columns]
customer_id = "str"
loan_type = "str"
amount_utilized = "float"
utilization_date = "datetime"
loan_reason = "str"

[[entities]]
name = "support_tickets"
cursor_column = "ticket_id"
cursor_mode = "seen_set"

[entities.columns]
ticket_id = "str"
severity = "str"
complaint_date = "datetime"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "silo.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "silo.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config_parses() {
        let content = InitArgs::generate_minimal_config();
        let config: crate::config::SiloConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_config_with_examples_parses() {
        let content = InitArgs::generate_config_with_examples();
        let config: crate::config::SiloConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.entities.len(), 2);
    }
}
