//! Entity cursor model
//!
//! An [`EntityCursor`] is the in-memory answer to "what has already been
//! ingested" for one (entity, cursor column) pair. It comes in exactly one of
//! two shapes, declared per entity in configuration:
//!
//! - *Watermark*: the highest value ingested so far, for columns with a
//!   natural total order (dates, zero-padded ids). Comparison is plain string
//!   order, which is the natural order for those columns.
//! - *Seen set*: every value ever ingested, for columns with no useful order.
//!
//! Watermark updates are monotonic non-decreasing; seen-set updates are
//! idempotent and commutative (re-absorbing the same values is a no-op).

use crate::config::CursorMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Incremental cursor for one entity, in its declared shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EntityCursor {
    /// Highest value ingested so far
    Watermark {
        /// Current watermark value
        value: String,
    },
    /// All values ever ingested
    SeenSet {
        /// Distinct ingested values
        values: BTreeSet<String>,
    },
}

impl EntityCursor {
    /// Creates an empty cursor in the given shape
    pub fn empty(mode: CursorMode) -> Self {
        match mode {
            CursorMode::Watermark => Self::Watermark {
                value: String::new(),
            },
            CursorMode::SeenSet => Self::SeenSet {
                values: BTreeSet::new(),
            },
        }
    }

    /// The shape of this cursor
    pub fn mode(&self) -> CursorMode {
        match self {
            Self::Watermark { .. } => CursorMode::Watermark,
            Self::SeenSet { .. } => CursorMode::SeenSet,
        }
    }

    /// Returns true if no value has ever been absorbed
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Watermark { value } => value.is_empty(),
            Self::SeenSet { values } => values.is_empty(),
        }
    }

    /// Decides whether a row value is genuinely new
    ///
    /// Watermark: strictly greater than the current watermark.
    /// Seen set: not already a member. An unset cursor admits everything.
    pub fn is_new(&self, candidate: &str) -> bool {
        match self {
            Self::Watermark { value } => value.is_empty() || candidate > value.as_str(),
            Self::SeenSet { values } => !values.contains(candidate),
        }
    }

    /// Absorbs the values of a filtered batch into the cursor
    ///
    /// Watermark: advances to the maximum of the current value and the
    /// incoming values (never regresses). Seen set: unions the incoming
    /// values.
    pub fn absorb<I>(&mut self, incoming: I)
    where
        I: IntoIterator<Item = String>,
    {
        match self {
            Self::Watermark { value } => {
                for candidate in incoming {
                    if candidate.as_str() > value.as_str() {
                        *value = candidate;
                    }
                }
            }
            Self::SeenSet { values } => {
                values.extend(incoming);
            }
        }
    }

    /// Current watermark, if this cursor is watermark-shaped and set
    pub fn watermark(&self) -> Option<&str> {
        match self {
            Self::Watermark { value } if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    /// Seen values, if this cursor is set-shaped
    pub fn seen(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::SeenSet { values } => Some(values),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cursor_admits_everything() {
        let watermark = EntityCursor::empty(CursorMode::Watermark);
        assert!(watermark.is_unset());
        assert!(watermark.is_new("2024-01-01"));

        let seen = EntityCursor::empty(CursorMode::SeenSet);
        assert!(seen.is_new("anything"));
    }

    #[test]
    fn test_watermark_strictly_greater() {
        let mut cursor = EntityCursor::empty(CursorMode::Watermark);
        cursor.absorb(["2024-01-04".to_string()]);

        assert!(!cursor.is_new("2024-01-03"));
        assert!(!cursor.is_new("2024-01-04"));
        assert!(cursor.is_new("2024-01-05"));
    }

    #[test]
    fn test_watermark_monotonic() {
        let mut cursor = EntityCursor::empty(CursorMode::Watermark);
        cursor.absorb(["2024-01-07".to_string()]);
        // Absorbing older values never regresses the watermark.
        cursor.absorb(["2024-01-02".to_string(), "2024-01-05".to_string()]);
        assert_eq!(cursor.watermark(), Some("2024-01-07"));
    }

    #[test]
    fn test_seen_set_membership() {
        let mut cursor = EntityCursor::empty(CursorMode::SeenSet);
        cursor.absorb(["t-1".to_string(), "t-2".to_string()]);

        assert!(!cursor.is_new("t-1"));
        assert!(cursor.is_new("t-3"));
    }

    #[test]
    fn test_seen_set_union_idempotent() {
        let mut cursor = EntityCursor::empty(CursorMode::SeenSet);
        cursor.absorb(["a".to_string(), "b".to_string()]);
        let before = cursor.clone();
        cursor.absorb(["b".to_string(), "a".to_string()]);
        assert_eq!(cursor, before);
    }

    #[test]
    fn test_serialization_tags_mode() {
        let mut cursor = EntityCursor::empty(CursorMode::Watermark);
        cursor.absorb(["2024-01-07".to_string()]);
        let json = serde_json::to_string(&cursor).unwrap();
        assert!(json.contains("\"mode\":\"watermark\""));

        let back: EntityCursor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cursor);
    }

    #[test]
    fn test_mode_accessor() {
        assert_eq!(
            EntityCursor::empty(CursorMode::SeenSet).mode(),
            CursorMode::SeenSet
        );
    }
}
