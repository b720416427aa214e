//! Schema validation with date coercion
//!
//! Validates an extracted batch against the entity's declared columns before
//! any filtering happens, so type coercion (notably date normalization) is
//! applied uniformly even to rows later dropped by the cursor filter.

use crate::config::{ColumnType, EntityConfig};
use crate::domain::batch::Batch;
use crate::domain::errors::SiloError;
use crate::domain::result::Result;
use chrono::NaiveDate;
use serde_json::Value;

/// Date renderings accepted by coercion, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d", "%d-%m-%Y"];

/// Canonical rendering every datetime column is coerced to
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates a batch against an entity's declared schema
///
/// Checks that every declared column is present and type-compatible, and
/// coerces datetime columns to canonical `YYYY-MM-DD` strings in place.
/// Entities with no declared columns pass validation unchanged.
///
/// # Errors
///
/// Returns `SiloError::SchemaValidation` on a missing column, a type
/// mismatch, or a date value no accepted format parses.
pub fn validate(batch: &mut Batch, entity: &EntityConfig) -> Result<()> {
    for (column, ty) in &entity.columns {
        if !batch.has_column(column) {
            return Err(SiloError::SchemaValidation(format!(
                "Missing column {} in {}",
                column, entity.name
            )));
        }
        match ty {
            ColumnType::Str => check_strings(batch, column, &entity.name)?,
            ColumnType::Int => check_integers(batch, column, &entity.name)?,
            ColumnType::Float => check_numbers(batch, column, &entity.name)?,
            ColumnType::Datetime => coerce_dates(batch, column, &entity.name)?,
        }
    }

    tracing::info!(entity = %entity.name, "Schema validation passed");
    Ok(())
}

fn check_strings(batch: &Batch, column: &str, entity: &str) -> Result<()> {
    for row in 0..batch.row_count() {
        match batch.value(row, column) {
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(SiloError::SchemaValidation(format!(
                    "Column {column} is expected to be a string, but row {row} holds {other} in {entity}"
                )))
            }
            None => unreachable!("column presence checked by caller"),
        }
    }
    Ok(())
}

fn check_integers(batch: &Batch, column: &str, entity: &str) -> Result<()> {
    for row in 0..batch.row_count() {
        let ok = matches!(batch.value(row, column), Some(Value::Number(n)) if n.is_i64() || n.is_u64());
        if !ok {
            return Err(SiloError::SchemaValidation(format!(
                "Column {column} is expected to be an integer in {entity} (row {row})"
            )));
        }
    }
    Ok(())
}

fn check_numbers(batch: &Batch, column: &str, entity: &str) -> Result<()> {
    for row in 0..batch.row_count() {
        let ok = matches!(batch.value(row, column), Some(Value::Number(_)));
        if !ok {
            return Err(SiloError::SchemaValidation(format!(
                "Column {column} is expected to be numeric in {entity} (row {row})"
            )));
        }
    }
    Ok(())
}

fn coerce_dates(batch: &mut Batch, column: &str, entity: &str) -> Result<()> {
    for row in 0..batch.row_count() {
        let text = match batch.value(row, column) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(SiloError::SchemaValidation(format!(
                    "Error converting column {column} to date: row {row} holds {other} in {entity}"
                )))
            }
            None => unreachable!("column presence checked by caller"),
        };
        let date = parse_date(&text).ok_or_else(|| {
            SiloError::SchemaValidation(format!(
                "Error converting column {column} to date: unparseable value '{text}' in {entity}"
            ))
        })?;
        batch.set_value(
            row,
            column,
            Value::String(date.format(CANONICAL_DATE_FORMAT).to_string()),
        )?;
    }
    Ok(())
}

/// Parses a date-like string using the accepted formats, in order
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
        // Formats with a time component need the datetime parser.
        if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CursorMode;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn entity_with(columns: Vec<(&str, ColumnType)>) -> EntityConfig {
        EntityConfig {
            name: "loans".to_string(),
            cursor_column: columns
                .first()
                .map(|(name, _)| name.to_string())
                .unwrap_or_default(),
            cursor_mode: CursorMode::Watermark,
            columns: columns
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect::<BTreeMap<_, _>>(),
            cipher_column: None,
        }
    }

    #[test]
    fn test_missing_column_rejected() {
        let entity = entity_with(vec![("amount", ColumnType::Float)]);
        let mut batch = Batch::new(vec!["other".to_string()]);
        batch.push_row(vec![json!(1.0)]).unwrap();

        let err = validate(&mut batch, &entity).unwrap_err();
        assert!(matches!(err, SiloError::SchemaValidation(_)));
        assert!(err.to_string().contains("Missing column"));
    }

    #[test]
    fn test_string_type_check() {
        let entity = entity_with(vec![("name", ColumnType::Str)]);
        let mut batch = Batch::new(vec!["name".to_string()]);
        batch.push_row(vec![json!("alice")]).unwrap();
        assert!(validate(&mut batch, &entity).is_ok());

        let mut bad = Batch::new(vec!["name".to_string()]);
        bad.push_row(vec![json!(42)]).unwrap();
        assert!(validate(&mut bad, &entity).is_err());
    }

    #[test]
    fn test_integer_type_check() {
        let entity = entity_with(vec![("count", ColumnType::Int)]);
        let mut batch = Batch::new(vec!["count".to_string()]);
        batch.push_row(vec![json!(3)]).unwrap();
        assert!(validate(&mut batch, &entity).is_ok());

        let mut bad = Batch::new(vec!["count".to_string()]);
        bad.push_row(vec![json!(3.5)]).unwrap();
        assert!(validate(&mut bad, &entity).is_err());
    }

    #[test]
    fn test_float_accepts_any_number() {
        let entity = entity_with(vec![("amount", ColumnType::Float)]);
        let mut batch = Batch::new(vec!["amount".to_string()]);
        batch.push_row(vec![json!(3)]).unwrap();
        batch.push_row(vec![json!(3.25)]).unwrap();
        assert!(validate(&mut batch, &entity).is_ok());
    }

    #[test]
    fn test_date_coercion_to_canonical() {
        let entity = entity_with(vec![("payment_date", ColumnType::Datetime)]);
        let mut batch = Batch::new(vec!["payment_date".to_string()]);
        batch.push_row(vec![json!("2024/01/05")]).unwrap();
        batch.push_row(vec![json!("2024-01-06 13:45:00")]).unwrap();

        validate(&mut batch, &entity).unwrap();
        assert_eq!(batch.value(0, "payment_date"), Some(&json!("2024-01-05")));
        assert_eq!(batch.value(1, "payment_date"), Some(&json!("2024-01-06")));
    }

    #[test]
    fn test_unparseable_date_rejected() {
        let entity = entity_with(vec![("payment_date", ColumnType::Datetime)]);
        let mut batch = Batch::new(vec!["payment_date".to_string()]);
        batch.push_row(vec![json!("next tuesday")]).unwrap();

        let err = validate(&mut batch, &entity).unwrap_err();
        assert!(err.to_string().contains("unparseable"));
    }

    #[test]
    fn test_entity_without_declared_columns_passes() {
        let entity = entity_with(vec![]);
        let mut batch = Batch::new(vec!["anything".to_string()]);
        batch.push_row(vec![json!("x")]).unwrap();
        assert!(validate(&mut batch, &entity).is_ok());
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-01-05").is_some());
        assert!(parse_date("2024/01/05").is_some());
        assert!(parse_date("05-01-2024").is_some());
        assert!(parse_date("garbage").is_none());
    }
}
