//! Format-specific extractors
//!
//! One extractor per supported landing format, dispatched by the extension
//! resolved in [`crate::domain::FileFormat`]:
//!
//! - [`delimited`] - CSV (`,`) and delimited TXT (pipe by default)
//! - [`json`] - JSON array of flat objects
//!
//! Extractors are stateless: `parse(path) -> Batch`, with any read or parse
//! failure surfacing as a pipeline failure for that file.

pub mod delimited;
pub mod json;

use crate::config::ExtractConfig;
use crate::domain::batch::Batch;
use crate::domain::errors::SiloError;
use crate::domain::result::Result;
use crate::domain::work_item::FileFormat;
use std::path::Path;

/// Extracts a landing file into a batch using the extractor for its format
///
/// # Errors
///
/// Returns an extract error if the file cannot be read or parsed.
pub fn extract(path: &Path, format: FileFormat, config: &ExtractConfig) -> Result<Batch> {
    match format {
        FileFormat::Csv => delimited::parse(path, b','),
        FileFormat::Txt => {
            let delimiter = config.txt_delimiter.as_bytes().first().copied().ok_or_else(|| {
                SiloError::Configuration("extract.txt_delimiter cannot be empty".to_string())
            })?;
            delimited::parse(path, delimiter)
        }
        FileFormat::Json => json::parse(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_dispatch_by_format() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("loans_20240101.csv");
        std::fs::File::create(&csv_path)
            .unwrap()
            .write_all(b"id\n1\n")
            .unwrap();
        let txt_path = dir.path().join("support_20240101.txt");
        std::fs::File::create(&txt_path)
            .unwrap()
            .write_all(b"id|x\na|b\n")
            .unwrap();
        let json_path = dir.path().join("tx_20240101.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(br#"[{"id":"a"}]"#)
            .unwrap();

        let config = ExtractConfig::default();
        assert_eq!(
            extract(&csv_path, FileFormat::Csv, &config)
                .unwrap()
                .row_count(),
            1
        );
        assert_eq!(
            extract(&txt_path, FileFormat::Txt, &config)
                .unwrap()
                .value(0, "x"),
            Some(&json!("b"))
        );
        assert_eq!(
            extract(&json_path, FileFormat::Json, &config)
                .unwrap()
                .row_count(),
            1
        );
    }
}
