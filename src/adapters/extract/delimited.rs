//! Delimited text extraction (CSV and pipe-separated TXT)

use crate::domain::batch::Batch;
use crate::domain::errors::SiloError;
use crate::domain::result::Result;
use serde_json::Value;
use std::path::Path;

/// Parses a delimited file with a header row into a batch
///
/// Cell types are inferred per value: integers, then floats, then text.
/// This mirrors how a typed staging store would read the same file.
///
/// # Errors
///
/// Returns an extract error for an unreadable file or ragged rows.
pub fn parse(path: &Path, delimiter: u8) -> Result<Batch> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| SiloError::Extract(format!("Failed to open {}: {}", path.display(), e)))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| SiloError::Extract(format!("Failed to read header of {}: {}", path.display(), e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut batch = Batch::new(columns);
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            SiloError::Extract(format!(
                "Malformed record at line {} of {}: {}",
                line + 2,
                path.display(),
                e
            ))
        })?;
        let row: Vec<Value> = record.iter().map(infer_cell).collect();
        batch.push_row(row)?;
    }

    tracing::info!(
        path = %path.display(),
        rows = batch.row_count(),
        columns = batch.columns().len(),
        "Extracted delimited file"
    );
    Ok(batch)
}

/// Infers a typed cell from raw delimited text
fn infer_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        // Zero-padded ids like "007" stay text, not numbers.
        if trimmed == int.to_string() {
            return Value::from(int);
        }
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if trimmed.contains('.') && float.is_finite() {
            return Value::from(float);
        }
    }
    Value::String(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_csv_with_inference() {
        let file = write_file("id,amount,date\nb-1,120.5,2024-01-05\nb-2,99,2024-01-06\n");
        let batch = parse(file.path(), b',').unwrap();

        assert_eq!(batch.columns(), &["id", "amount", "date"]);
        assert_eq!(batch.row_count(), 2);
        assert_eq!(batch.value(0, "amount"), Some(&json!(120.5)));
        assert_eq!(batch.value(1, "amount"), Some(&json!(99)));
        assert_eq!(batch.value(0, "date"), Some(&json!("2024-01-05")));
    }

    #[test]
    fn test_parse_pipe_delimited() {
        let file = write_file("ticket_id|severity\nt-1|high\nt-2|low\n");
        let batch = parse(file.path(), b'|').unwrap();

        assert_eq!(batch.row_count(), 2);
        assert_eq!(batch.value(1, "severity"), Some(&json!("low")));
    }

    #[test]
    fn test_zero_padded_ids_stay_text() {
        let file = write_file("id\n007\n");
        let batch = parse(file.path(), b',').unwrap();
        assert_eq!(batch.value(0, "id"), Some(&json!("007")));
    }

    #[test]
    fn test_unreadable_path_is_extract_error() {
        let err = parse(Path::new("/nonexistent/file.csv"), b',').unwrap_err();
        assert!(matches!(err, SiloError::Extract(_)));
    }

    #[test]
    fn test_ragged_row_is_extract_error() {
        let file = write_file("a,b\n1,2,3\n");
        assert!(parse(file.path(), b',').is_err());
    }
}
