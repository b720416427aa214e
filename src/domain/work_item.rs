//! Work item model
//!
//! A [`WorkItem`] is one discovered landing file plus the entity and format
//! resolved from its name. Resolution is purely a naming convention: the
//! entity is the filename stem minus a trailing `_<timestamp>` suffix, and
//! the format is the extension. Nothing is derived from file content.

use crate::domain::errors::SiloError;
use crate::domain::ids::EntityName;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File format resolved from a landing file's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Delimited text (pipe-separated by default)
    Txt,
    /// JSON array of flat objects
    Json,
}

impl FileFormat {
    /// Resolves a format from a file extension
    ///
    /// # Errors
    ///
    /// Returns `SiloError::UnsupportedFormat` for any other extension.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Txt),
            "json" => Ok(Self::Json),
            other => Err(SiloError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        };
        write!(f, "{name}")
    }
}

/// One landing file queued for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Absolute path of the landing file
    pub path: PathBuf,
    /// Entity resolved from the filename stem
    pub entity: EntityName,
    /// Format resolved from the extension
    pub format: FileFormat,
    /// Filename stem, used as the staging destination name
    pub stem: String,
}

impl WorkItem {
    /// Resolves a work item from a landing path
    ///
    /// The stem `loans_20240105120000` resolves to entity `loans`; a stem
    /// without a `_<timestamp>` suffix is used verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the path has no stem or an unsupported extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SiloError::Other(format!("Path has no file stem: {}", path.display())))?
            .to_string();

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let format = FileFormat::from_extension(ext)?;

        let entity_str = match stem.rsplit_once('_') {
            Some((prefix, suffix)) if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) => prefix,
            _ => stem.as_str(),
        };
        let entity = EntityName::new(entity_str)
            .map_err(|e| SiloError::Other(format!("Invalid entity in {}: {e}", path.display())))?;

        Ok(Self {
            path: path.to_path_buf(),
            entity,
            format,
            stem,
        })
    }
}
