//! JSON extraction (array of flat objects)

use crate::domain::batch::Batch;
use crate::domain::errors::SiloError;
use crate::domain::result::Result;
use serde_json::Value;
use std::path::Path;

/// Parses a JSON file holding an array of flat objects into a batch
///
/// Column order follows the first object's keys; every object must carry
/// exactly the same keys. Cell types are preserved as written.
///
/// # Errors
///
/// Returns an extract error for unreadable files, non-array documents, or
/// objects whose keys disagree.
pub fn parse(path: &Path) -> Result<Batch> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| SiloError::Extract(format!("Failed to read {}: {}", path.display(), e)))?;
    let document: Value = serde_json::from_str(&contents)
        .map_err(|e| SiloError::Extract(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    let Value::Array(objects) = document else {
        return Err(SiloError::Extract(format!(
            "Expected a JSON array of objects in {}",
            path.display()
        )));
    };

    let mut columns: Vec<String> = Vec::new();
    for (index, object) in objects.iter().enumerate() {
        let Value::Object(map) = object else {
            return Err(SiloError::Extract(format!(
                "Element {} of {} is not an object",
                index,
                path.display()
            )));
        };
        if index == 0 {
            columns = map.keys().cloned().collect();
        } else if map.len() != columns.len() || !columns.iter().all(|c| map.contains_key(c)) {
            return Err(SiloError::Extract(format!(
                "Element {} of {} has mismatched keys",
                index,
                path.display()
            )));
        }
    }

    let mut batch = Batch::new(columns.clone());
    for object in &objects {
        let map = object.as_object().expect("checked above");
        let row = columns.iter().map(|c| map[c].clone()).collect();
        batch.push_row(row)?;
    }

    tracing::info!(
        path = %path.display(),
        rows = batch.row_count(),
        columns = batch.columns().len(),
        "Extracted JSON file"
    );
    Ok(batch)
}
