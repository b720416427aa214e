//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for the identifiers that key the
//! ingestion pipeline: entity names and cursor columns. Each type ensures
//! type safety and rejects empty values at construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity name newtype wrapper
///
/// Represents the logical table an arriving file belongs to. Derived from the
/// filename stem by stripping the trailing `_<timestamp>` suffix, e.g.
/// `loans_20240105120000.csv` resolves to entity `loans`.
///
/// # Examples
///
/// ```
/// use silo::domain::ids::EntityName;
/// use std::str::FromStr;
///
/// let entity = EntityName::from_str("credit_cards_billing").unwrap();
/// assert_eq!(entity.as_str(), "credit_cards_billing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    /// Creates a new EntityName from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or whitespace-only.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Entity name cannot be empty".to_string());
        }
        Ok(Self(name))
    }

    /// Returns the entity name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Cursor column newtype wrapper
///
/// Names the column an entity's incremental cursor tracks, e.g. `bill_id`
/// for a seen-set entity or `utilization_date` for a watermark entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorColumn(String);

impl CursorColumn {
    /// Creates a new CursorColumn from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the column name is empty or whitespace-only.
    pub fn new(column: impl Into<String>) -> Result<Self, String> {
        let column = column.into();
        if column.trim().is_empty() {
            return Err("Cursor column cannot be empty".to_string());
        }
        Ok(Self(column))
    }

    /// Returns the column name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CursorColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CursorColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CursorColumn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
