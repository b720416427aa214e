//! Tabular batch model
//!
//! A [`Batch`] is the in-memory representation of one extracted file: an
//! ordered list of column names plus rows of JSON cells. Every pipeline stage
//! (validate, state-filter, transform, load) consumes and produces batches.

use crate::domain::errors::SiloError;
use crate::domain::result::Result;
use serde_json::Value;

/// Tabular batch of rows flowing through the pipeline
///
/// Columns are ordered and unique; every row has exactly one cell per column.
/// Cells are `serde_json::Value`s so extractors can preserve source typing
/// (strings from delimited files, numbers from JSON) and transformers can
/// derive new typed columns.
///
/// # Examples
///
/// ```
/// use silo::domain::batch::Batch;
/// use serde_json::json;
///
/// let mut batch = Batch::new(vec!["id".to_string(), "amount".to_string()]);
/// batch.push_row(vec![json!("b-1"), json!(120.5)]).unwrap();
/// assert_eq!(batch.row_count(), 1);
/// assert_eq!(batch.value(0, "id"), Some(&json!("b-1")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Batch {
    /// Creates an empty batch with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row to the batch
    ///
    /// # Errors
    ///
    /// Returns an error if the row's cell count doesn't match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(SiloError::Extract(format!(
                "Row has {} cells but batch has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns the column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the batch has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns true if the batch has a column with the given name
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Returns the cell at (row, column name), if both exist
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Replaces the cell at (row, column name)
    ///
    /// # Errors
    ///
    /// Returns an error if the column or row doesn't exist.
    pub fn set_value(&mut self, row: usize, column: &str, value: Value) -> Result<()> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| SiloError::Transform(format!("Unknown column: {column}")))?;
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(idx))
            .ok_or_else(|| SiloError::Transform(format!("Row {row} out of range")))?;
        *cell = value;
        Ok(())
    }

    /// Returns all values of a column as cursor strings, in row order
    ///
    /// String cells yield their inner text; other cells their JSON rendering.
    /// This is the representation the state store compares and persists.
    pub fn column_cursor_values(&self, column: &str) -> Vec<String> {
        match self.column_index(column) {
            Some(idx) => self.rows.iter().map(|r| cursor_string(&r[idx])).collect(),
            None => Vec::new(),
        }
    }

    /// Appends a derived column
    ///
    /// # Errors
    ///
    /// Returns an error if the column already exists or `values` doesn't have
    /// one entry per row.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(SiloError::Transform(format!(
                "Column already exists: {name}"
            )));
        }
        if values.len() != self.rows.len() {
            return Err(SiloError::Transform(format!(
                "Column {} has {} values but batch has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Keeps only rows for which the predicate returns true
    ///
    /// The predicate receives each row's cell in the given column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist.
    pub fn retain_by_column<F>(&mut self, column: &str, mut keep: F) -> Result<()>
    where
        F: FnMut(&Value) -> bool,
    {
        let idx = self
            .column_index(column)
            .ok_or_else(|| SiloError::State(format!("Unknown cursor column: {column}")))?;
        self.rows.retain(|row| keep(&row[idx]));
        Ok(())
    }

    /// Renders one row as a JSON object keyed by column name
    pub fn row_object(&self, row: usize) -> Option<serde_json::Map<String, Value>> {
        let cells = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect(),
        )
    }
}

/// Renders a cell as the string the state store compares and persists
///
/// String cells yield their inner text (no JSON quoting); everything else
/// falls back to compact JSON.
pub fn cursor_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Batch {
        let mut batch = Batch::new(vec!["id".to_string(), "date".to_string()]);
        batch
            .push_row(vec![json!("a"), json!("2024-01-05")])
            .unwrap();
        batch
            .push_row(vec![json!("b"), json!("2024-01-06")])
            .unwrap();
        batch
    }

    #[test]
    fn test_push_row_arity_mismatch() {
        let mut batch = Batch::new(vec!["only".to_string()]);
        assert!(batch.push_row(vec![json!(1), json!(2)]).is_err());
    }

    #[test]
    fn test_value_lookup() {
        let batch = sample();
        assert_eq!(batch.value(1, "date"), Some(&json!("2024-01-06")));
        assert_eq!(batch.value(0, "missing"), None);
        assert_eq!(batch.value(9, "id"), None);
    }

    #[test]
    fn test_add_column() {
        let mut batch = sample();
        batch
            .add_column("flag", vec![json!(true), json!(false)])
            .unwrap();
        assert!(batch.has_column("flag"));
        assert_eq!(batch.value(0, "flag"), Some(&json!(true)));
    }

    #[test]
    fn test_add_column_duplicate_rejected() {
        let mut batch = sample();
        let err = batch.add_column("id", vec![json!(1), json!(2)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_retain_by_column() {
        let mut batch = sample();
        batch
            .retain_by_column("date", |v| cursor_string(v).as_str() > "2024-01-05")
            .unwrap();
        assert_eq!(batch.row_count(), 1);
        assert_eq!(batch.value(0, "id"), Some(&json!("b")));
    }

    #[test]
    fn test_cursor_string_rendering() {
        assert_eq!(cursor_string(&json!("plain")), "plain");
        assert_eq!(cursor_string(&json!(42)), "42");
        assert_eq!(cursor_string(&json!(1.5)), "1.5");
    }

    #[test]
    fn test_row_object() {
        let batch = sample();
        let obj = batch.row_object(0).unwrap();
        assert_eq!(obj.get("id"), Some(&json!("a")));
        assert_eq!(obj.get("date"), Some(&json!("2024-01-05")));
    }
}
