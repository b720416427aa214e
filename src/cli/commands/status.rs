//! Status command implementation
//!
//! This module implements the `status` command for displaying persisted
//! cursor state per entity.

use crate::config::{load_config, CursorMode};
use crate::core::state::StateStore;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Filter by entity name
    #[arg(long)]
    pub entity: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking cursor status");

        println!("📊 Cursor Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        let store = match StateStore::new(&config.state.dir) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open state directory");
                println!("   Error: {}", e);
                return Ok(4);
            }
        };

        let documents = match store.list_persisted() {
            Ok(d) => d,
            Err(e) => {
                println!("❌ Failed to read cursor documents");
                println!("   Error: {}", e);
                return Ok(5); // Fatal error exit code
            }
        };

        if documents.is_empty() {
            println!("No cursor state found.");
            println!("Run 'silo run' to start ingesting files.");
            return Ok(0);
        }

        let filtered: Vec<_> = documents
            .iter()
            .filter(|d| match self.entity {
                Some(ref name) => &d.entity == name,
                None => true,
            })
            .collect();

        if filtered.is_empty() {
            println!("No cursors match the specified filter.");
            return Ok(0);
        }

        println!("Found {} cursor(s):", filtered.len());
        println!();
        println!(
            "{:<25} {:<25} {:<12} {:<30}",
            "Entity", "Column", "Mode", "Position"
        );
        println!("{}", "-".repeat(92));

        for document in filtered {
            let (mode, position) = match document.cursor.mode() {
                CursorMode::Watermark => (
                    "watermark",
                    document
                        .cursor
                        .watermark()
                        .unwrap_or("<unset>")
                        .to_string(),
                ),
                CursorMode::SeenSet => (
                    "seen_set",
                    format!(
                        "{} value(s) seen",
                        document.cursor.seen().map_or(0, |s| s.len())
                    ),
                ),
            };

            println!(
                "{:<25} {:<25} {:<12} {:<30}",
                document.entity, document.column, mode, position
            );
        }

        println!();
        Ok(0)
    }
}
