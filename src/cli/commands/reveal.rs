//! Reveal command implementation
//!
//! This module implements the `reveal` command: recover the cipher key of an
//! obfuscated column in a staging file and print the decrypted rows. The key
//! is never stored, so recovery works from ciphertext alone against the
//! configured word dictionary.

use crate::config::load_config;
use crate::core::cipher::{self, Dictionary};
use crate::domain::batch::Batch;
use clap::Args;
use serde_json::Value;
use std::path::Path;

/// Arguments for the reveal command
#[derive(Args, Debug)]
pub struct RevealArgs {
    /// Staging file (JSON Lines) holding the obfuscated column
    pub file: String,

    /// Name of the obfuscated column
    #[arg(short, long)]
    pub column: String,
}

impl RevealArgs {
    /// Execute the reveal command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file, column = %self.column, "Revealing obfuscated column");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let Some(ref dictionary_path) = config.cipher.dictionary_path else {
            eprintln!("No [cipher] dictionary_path configured");
            return Ok(2);
        };
        let dictionary = match Dictionary::from_file(dictionary_path) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Failed to load dictionary: {e}");
                return Ok(2);
            }
        };

        let mut batch = match read_staging_file(Path::new(&self.file)) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Failed to read staging file: {e}");
                return Ok(5); // Fatal error exit code
            }
        };
        if !batch.has_column(&self.column) {
            eprintln!("Column '{}' not present in {}", self.column, self.file);
            return Ok(5);
        }

        let key = match cipher::decrypt_column(&mut batch, &self.column, &dictionary) {
            Ok(k) => k,
            Err(e) => {
                eprintln!("Decryption failed: {e}");
                return Ok(5);
            }
        };
        if key == 0 {
            println!("❓ Key recovery inconclusive, column left as-is");
            return Ok(1); // Partial failure
        }

        println!("🔑 Recovered key: {key}");
        println!();
        for row in 0..batch.row_count() {
            if let Some(Value::String(text)) = batch.value(row, &self.column) {
                println!("{text}");
            }
        }
        Ok(0)
    }
}

/// Reads a staging JSON Lines file back into a batch
fn read_staging_file(path: &Path) -> crate::domain::Result<Batch> {
    use crate::domain::SiloError;

    let contents = std::fs::read_to_string(path)
        .map_err(|e| SiloError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let mut columns: Vec<String> = Vec::new();
    let mut batch = Batch::new(Vec::new());
    for (index, line) in contents.lines().enumerate() {
        let object: serde_json::Map<String, Value> = serde_json::from_str(line).map_err(|e| {
            SiloError::Serialization(format!("Line {} of {}: {}", index + 1, path.display(), e))
        })?;
        if index == 0 {
            columns = object.keys().cloned().collect();
            batch = Batch::new(columns.clone());
        }
        let row = columns
            .iter()
            .map(|c| object.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        batch.push_row(row)?;
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_staging_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id":"a","reason":"ipmf sfopwbujpo"}}"#).unwrap();
        writeln!(file, r#"{{"id":"b","reason":"dbs qvsdibtf"}}"#).unwrap();
        file.flush().unwrap();

        let batch = read_staging_file(file.path()).unwrap();
        assert_eq!(batch.row_count(), 2);
        assert_eq!(batch.value(0, "id"), Some(&json!("a")));
        assert_eq!(batch.value(1, "reason"), Some(&json!("dbs qvsdibtf")));
    }

    #[test]
    fn test_read_staging_file_invalid_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        file.flush().unwrap();
        assert!(read_staging_file(file.path()).is_err());
    }

    #[test]
    fn test_reveal_args() {
        let args = RevealArgs {
            file: "/stage/loans/loans_1.jsonl".to_string(),
            column: "loan_reason".to_string(),
        };
        assert_eq!(args.column, "loan_reason");
    }
}
