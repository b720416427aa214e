//! Staging loader
//!
//! The final pipeline stage. A transformed batch is written to the staging
//! area as JSON Lines, one object per row, under
//! `<staging.base_dir>/<entity>/<file-stem>.jsonl`. The write is atomic
//! (temp file then rename) so a crash mid-write never leaves a partial
//! staging file for a cursor that was already flushed.

use crate::domain::batch::Batch;
use crate::domain::errors::SiloError;
use crate::domain::ids::EntityName;
use crate::domain::result::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes batches to the entity-partitioned staging area
#[derive(Debug, Clone)]
pub struct StagingLoader {
    base_dir: PathBuf,
}

impl StagingLoader {
    /// Creates a loader rooted at the staging base directory
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Destination path for a given entity and source file stem
    pub fn destination(&self, entity: &EntityName, stem: &str) -> PathBuf {
        self.base_dir
            .join(entity.as_str())
            .join(format!("{stem}.jsonl"))
    }

    /// Loads a batch to staging
    ///
    /// Returns the path of the written staging file.
    ///
    /// # Errors
    ///
    /// Returns a load error if the destination directory cannot be created
    /// or the file cannot be written.
    pub fn load(&self, batch: &Batch, entity: &EntityName, stem: &str) -> Result<PathBuf> {
        let destination = self.destination(entity, stem);
        let parent = destination
            .parent()
            .ok_or_else(|| SiloError::Load(format!("No parent for {}", destination.display())))?;
        fs::create_dir_all(parent).map_err(|e| {
            SiloError::Load(format!("Failed to create {}: {}", parent.display(), e))
        })?;

        let tmp = destination.with_extension("jsonl.tmp");
        write_rows(&tmp, batch)?;
        fs::rename(&tmp, &destination).map_err(|e| {
            SiloError::Load(format!("Failed to rename {}: {}", tmp.display(), e))
        })?;

        tracing::info!(
            entity = %entity,
            path = %destination.display(),
            rows = batch.row_count(),
            "Loaded batch to staging"
        );
        Ok(destination)
    }
}

fn write_rows(path: &Path, batch: &Batch) -> Result<()> {
    let file = fs::File::create(path)
        .map_err(|e| SiloError::Load(format!("Failed to create {}: {}", path.display(), e)))?;
    let mut writer = std::io::BufWriter::new(file);
    for row in 0..batch.row_count() {
        let object = batch
            .row_object(row)
            .ok_or_else(|| SiloError::Load(format!("Row {row} out of range")))?;
        serde_json::to_writer(&mut writer, &object)?;
        writer
            .write_all(b"\n")
            .map_err(|e| SiloError::Load(format!("Failed to write {}: {}", path.display(), e)))?;
    }
    writer
        .flush()
        .map_err(|e| SiloError::Load(format!("Failed to flush {}: {}", path.display(), e)))?;
    Ok(())
}
