//! Cursor persistence and incremental filtering
//!
//! The [`StateStore`] decides which rows of an arriving batch are genuinely
//! new and persists the answer. Each entity has its own independently
//! loadable and flushable slot, so loading entity B can never discard an
//! unflushed update for entity A.
//!
//! The store does no internal locking: it assumes a single writer processing
//! one file at a time, which the orchestrator's sequential pipeline
//! guarantees.

use crate::config::CursorMode;
use crate::core::state::cursor::EntityCursor;
use crate::domain::batch::{cursor_string, Batch};
use crate::domain::errors::SiloError;
use crate::domain::ids::{CursorColumn, EntityName};
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of filtering a batch against an entity's cursor
///
/// Exhaustion is a typed non-error outcome: a re-delivered, fully ingested
/// file is expected operational behavior, not a broken pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// At least one row survived; the batch contains only the new rows
    Filtered(Batch),
    /// No rows survived filtering; everything was already ingested
    Exhausted,
}

/// Persisted cursor document, one JSON file per entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorDocument {
    /// Entity the cursor belongs to
    pub entity: String,
    /// Column the cursor tracks
    pub column: String,
    /// Cursor value in its declared shape
    #[serde(flatten)]
    pub cursor: EntityCursor,
}

#[derive(Debug)]
struct Slot {
    column: CursorColumn,
    cursor: EntityCursor,
    dirty: bool,
}

/// Per-entity cursor store with durable JSON persistence
#[derive(Debug)]
pub struct StateStore {
    dir: PathBuf,
    slots: HashMap<EntityName, Slot>,
}

impl StateStore {
    /// Creates a store rooted at the given state directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            SiloError::State(format!(
                "Failed to create state directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self {
            dir,
            slots: HashMap::new(),
        })
    }

    fn document_path(&self, entity: &EntityName) -> PathBuf {
        self.dir.join(format!("{}.json", entity.as_str()))
    }

    /// Loads an entity's cursor into its slot
    ///
    /// Reads the persisted document if one exists, otherwise starts an empty
    /// cursor in the declared shape. A persisted document whose shape or
    /// column disagrees with the declaration is a state error, never a silent
    /// shape flip.
    ///
    /// # Errors
    ///
    /// Returns an error on unreadable or mismatched persisted state.
    pub fn load(
        &mut self,
        entity: &EntityName,
        column: &CursorColumn,
        mode: CursorMode,
    ) -> Result<()> {
        let path = self.document_path(entity);
        let cursor = if path.exists() {
            let document = read_document(&path)?;
            if document.cursor.mode() != mode {
                return Err(SiloError::State(format!(
                    "Persisted cursor for {} is {:?} but entity declares {:?}",
                    entity,
                    document.cursor.mode(),
                    mode
                )));
            }
            if document.column != column.as_str() {
                tracing::warn!(
                    entity = %entity,
                    persisted_column = %document.column,
                    declared_column = %column,
                    "Persisted cursor tracks a different column, starting empty"
                );
                EntityCursor::empty(mode)
            } else {
                tracing::info!(entity = %entity, column = %column, "Loaded cursor state");
                document.cursor
            }
        } else {
            tracing::info!(entity = %entity, column = %column, "No existing cursor state, starting empty");
            EntityCursor::empty(mode)
        };

        self.slots.insert(
            entity.clone(),
            Slot {
                column: column.clone(),
                cursor,
                dirty: false,
            },
        );
        Ok(())
    }

    /// Filters a batch down to rows not yet ingested
    ///
    /// Loads the entity's cursor, drops rows whose cursor-column value has
    /// been seen (set mode) or is not strictly greater than the watermark
    /// (watermark mode), then absorbs the surviving values into the in-memory
    /// slot. The slot is only made durable by [`flush`](Self::flush).
    ///
    /// An unset cursor (first ever file for the entity) admits every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch lacks the cursor column or persisted
    /// state is unreadable.
    pub fn filter(
        &mut self,
        batch: Batch,
        entity: &EntityName,
        column: &CursorColumn,
        mode: CursorMode,
    ) -> Result<FilterOutcome> {
        self.load(entity, column, mode)?;
        let slot = self
            .slots
            .get_mut(entity)
            .expect("slot inserted by load above");

        let mut batch = batch;
        batch.retain_by_column(column.as_str(), |value| {
            slot.cursor.is_new(&cursor_string(value))
        })?;

        if batch.is_empty() {
            tracing::info!(
                entity = %entity,
                column = %column,
                "No rows survived cursor filtering"
            );
            return Ok(FilterOutcome::Exhausted);
        }

        let kept = batch.column_cursor_values(column.as_str());
        slot.cursor.absorb(kept);
        slot.dirty = true;

        tracing::info!(
            entity = %entity,
            column = %column,
            rows = batch.row_count(),
            "Cursor filtering kept new rows"
        );
        Ok(FilterOutcome::Filtered(batch))
    }

    /// Durably persists an entity's slot
    ///
    /// Writes the cursor document atomically (temp file + rename). Flushing
    /// an entity whose slot was never loaded or never updated is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn flush(&mut self, entity: &EntityName) -> Result<()> {
        let path = self.document_path(entity);
        let Some(slot) = self.slots.get_mut(entity) else {
            tracing::warn!(entity = %entity, "No cursor slot loaded, nothing to flush");
            return Ok(());
        };
        if !slot.dirty {
            tracing::debug!(entity = %entity, "Cursor slot unchanged, nothing to flush");
            return Ok(());
        }

        let document = CursorDocument {
            entity: entity.as_str().to_string(),
            column: slot.column.as_str().to_string(),
            cursor: slot.cursor.clone(),
        };

        write_document(&path, &document)?;
        slot.dirty = false;

        tracing::info!(entity = %entity, path = %path.display(), "Flushed cursor state");
        Ok(())
    }

    /// Discards an entity's unflushed in-memory update
    ///
    /// Called by the orchestrator when a file fails after filtering, so a
    /// quarantined file's rows are not remembered as ingested.
    pub fn discard(&mut self, entity: &EntityName) {
        if self.slots.remove(entity).is_some() {
            tracing::debug!(entity = %entity, "Discarded unflushed cursor update");
        }
    }

    /// In-memory cursor for an entity, if its slot is loaded
    pub fn cursor(&self, entity: &EntityName) -> Option<&EntityCursor> {
        self.slots.get(entity).map(|slot| &slot.cursor)
    }

    /// Reads every persisted cursor document, for operator status output
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory is unreadable or a document
    /// is corrupt.
    pub fn list_persisted(&self) -> Result<Vec<CursorDocument>> {
        let mut documents = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                documents.push(read_document(&path)?);
            }
        }
        documents.sort_by(|a, b| a.entity.cmp(&b.entity));
        Ok(documents)
    }
}

fn read_document(path: &Path) -> Result<CursorDocument> {
    let contents = fs::read_to_string(path)
        .map_err(|e| SiloError::State(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| SiloError::State(format!("Corrupt cursor document {}: {}", path.display(), e)))
}

fn write_document(path: &Path, document: &CursorDocument) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let contents = serde_json::to_string_pretty(document)?;
    fs::write(&tmp, contents)
        .map_err(|e| SiloError::State(format!("Failed to write {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .map_err(|e| SiloError::State(format!("Failed to rename {}: {}", tmp.display(), e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn entity() -> EntityName {
        EntityName::new("loans").unwrap()
    }

    fn column() -> CursorColumn {
        CursorColumn::new("utilization_date").unwrap()
    }

    fn date_batch(dates: &[&str]) -> Batch {
        let mut batch = Batch::new(vec!["utilization_date".to_string()]);
        for date in dates {
            batch.push_row(vec![json!(date)]).unwrap();
        }
        batch
    }

    #[test]
    fn test_first_batch_admits_everything() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();

        let outcome = store
            .filter(
                date_batch(&["2024-01-05", "2024-01-06"]),
                &entity(),
                &column(),
                CursorMode::Watermark,
            )
            .unwrap();

        match outcome {
            FilterOutcome::Filtered(batch) => assert_eq!(batch.row_count(), 2),
            FilterOutcome::Exhausted => panic!("first batch must not be exhausted"),
        }
        assert_eq!(
            store.cursor(&entity()).unwrap().watermark(),
            Some("2024-01-06")
        );
    }

    #[test]
    fn test_watermark_filter_drops_old_rows() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();

        store
            .filter(
                date_batch(&["2024-01-04"]),
                &entity(),
                &column(),
                CursorMode::Watermark,
            )
            .unwrap();
        store.flush(&entity()).unwrap();

        let outcome = store
            .filter(
                date_batch(&["2024-01-03", "2024-01-04", "2024-01-05"]),
                &entity(),
                &column(),
                CursorMode::Watermark,
            )
            .unwrap();

        match outcome {
            FilterOutcome::Filtered(batch) => {
                assert_eq!(batch.row_count(), 1);
                assert_eq!(batch.value(0, "utilization_date"), Some(&json!("2024-01-05")));
            }
            FilterOutcome::Exhausted => panic!("one row is new"),
        }
    }

    #[test]
    fn test_idempotent_filtering_second_pass_exhausted() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();
        let batch = date_batch(&["2024-01-05", "2024-01-06"]);

        let first = store
            .filter(batch.clone(), &entity(), &column(), CursorMode::Watermark)
            .unwrap();
        assert!(matches!(first, FilterOutcome::Filtered(_)));
        store.flush(&entity()).unwrap();

        let second = store
            .filter(batch, &entity(), &column(), CursorMode::Watermark)
            .unwrap();
        assert_eq!(second, FilterOutcome::Exhausted);
    }

    #[test]
    fn test_exhausted_does_not_dirty_slot() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();

        let outcome = store
            .filter(
                Batch::new(vec!["utilization_date".to_string()]),
                &entity(),
                &column(),
                CursorMode::Watermark,
            )
            .unwrap();
        assert_eq!(outcome, FilterOutcome::Exhausted);

        store.flush(&entity()).unwrap();
        assert!(!dir.path().join("loans.json").exists());
    }

    #[test]
    fn test_flush_persists_and_reload_survives() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = StateStore::new(dir.path()).unwrap();
            store
                .filter(
                    date_batch(&["2024-01-07"]),
                    &entity(),
                    &column(),
                    CursorMode::Watermark,
                )
                .unwrap();
            store.flush(&entity()).unwrap();
        }

        // Fresh store sees the persisted watermark.
        let mut store = StateStore::new(dir.path()).unwrap();
        store
            .load(&entity(), &column(), CursorMode::Watermark)
            .unwrap();
        assert_eq!(
            store.cursor(&entity()).unwrap().watermark(),
            Some("2024-01-07")
        );
    }

    #[test]
    fn test_flush_marks_slot_clean() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();
        let document = dir.path().join("loans.json");

        store
            .filter(
                date_batch(&["2024-01-07"]),
                &entity(),
                &column(),
                CursorMode::Watermark,
            )
            .unwrap();
        store.flush(&entity()).unwrap();
        assert!(document.exists());

        // A clean slot is not rewritten on a second flush.
        fs::remove_file(&document).unwrap();
        store.flush(&entity()).unwrap();
        assert!(!document.exists());

        // The slot stays loaded and keeps filtering after the flush.
        let outcome = store
            .filter(
                date_batch(&["2024-01-08"]),
                &entity(),
                &column(),
                CursorMode::Watermark,
            )
            .unwrap();
        assert!(matches!(outcome, FilterOutcome::Filtered(_)));
        store.flush(&entity()).unwrap();
        assert!(document.exists());
    }

    #[test]
    fn test_seen_set_union_across_cycles() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();
        let tickets = EntityName::new("support_tickets").unwrap();
        let ticket_id = CursorColumn::new("ticket_id").unwrap();

        let mut batch_a = Batch::new(vec!["ticket_id".to_string()]);
        batch_a.push_row(vec![json!("t-1")]).unwrap();
        batch_a.push_row(vec![json!("t-2")]).unwrap();
        store
            .filter(batch_a, &tickets, &ticket_id, CursorMode::SeenSet)
            .unwrap();
        store.flush(&tickets).unwrap();

        let mut batch_b = Batch::new(vec!["ticket_id".to_string()]);
        batch_b.push_row(vec![json!("t-2")]).unwrap();
        batch_b.push_row(vec![json!("t-3")]).unwrap();
        let outcome = store
            .filter(batch_b, &tickets, &ticket_id, CursorMode::SeenSet)
            .unwrap();
        match outcome {
            FilterOutcome::Filtered(batch) => assert_eq!(batch.row_count(), 1),
            FilterOutcome::Exhausted => panic!("t-3 is new"),
        }
        store.flush(&tickets).unwrap();

        let documents = store.list_persisted().unwrap();
        assert_eq!(documents.len(), 1);
        let seen = documents[0].cursor.seen().unwrap();
        let expected: std::collections::BTreeSet<String> =
            ["t-1", "t-2", "t-3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(seen, &expected);
    }

    #[test]
    fn test_per_entity_slots_are_independent() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();
        let loans = entity();
        let tickets = EntityName::new("support_tickets").unwrap();
        let ticket_id = CursorColumn::new("ticket_id").unwrap();

        store
            .filter(
                date_batch(&["2024-01-05"]),
                &loans,
                &column(),
                CursorMode::Watermark,
            )
            .unwrap();

        // Loading another entity must not discard the loans update.
        let mut batch = Batch::new(vec!["ticket_id".to_string()]);
        batch.push_row(vec![json!("t-1")]).unwrap();
        store
            .filter(batch, &tickets, &ticket_id, CursorMode::SeenSet)
            .unwrap();

        store.flush(&loans).unwrap();
        store.flush(&tickets).unwrap();
        assert_eq!(store.list_persisted().unwrap().len(), 2);
    }

    #[test]
    fn test_discard_drops_unflushed_update() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();

        store
            .filter(
                date_batch(&["2024-01-05"]),
                &entity(),
                &column(),
                CursorMode::Watermark,
            )
            .unwrap();
        store.discard(&entity());
        store.flush(&entity()).unwrap();

        assert!(!dir.path().join("loans.json").exists());
    }

    #[test]
    fn test_mode_mismatch_is_error() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();

        store
            .filter(
                date_batch(&["2024-01-05"]),
                &entity(),
                &column(),
                CursorMode::Watermark,
            )
            .unwrap();
        store.flush(&entity()).unwrap();

        let result = store.load(&entity(), &column(), CursorMode::SeenSet);
        assert!(matches!(result, Err(SiloError::State(_))));
    }

    #[test]
    fn test_missing_cursor_column_is_error() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::new(dir.path()).unwrap();
        let batch = Batch::new(vec!["other".to_string()]);

        let result = store.filter(batch, &entity(), &column(), CursorMode::Watermark);
        assert!(result.is_err());
    }
}
