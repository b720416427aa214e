//! Quarantine moves for failed source files

use crate::domain::errors::SiloError;
use crate::domain::result::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Moves a failed source file into the flat quarantine directory
///
/// The file keeps its original name. Falls back to copy-and-remove when a
/// rename crosses filesystems.
///
/// # Errors
///
/// Returns an error if the quarantine directory cannot be created or the
/// file cannot be moved.
pub fn quarantine_file(source: &Path, quarantine_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(quarantine_dir).map_err(|e| {
        SiloError::Io(format!(
            "Failed to create quarantine directory {}: {}",
            quarantine_dir.display(),
            e
        ))
    })?;

    let name = source
        .file_name()
        .ok_or_else(|| SiloError::Other(format!("Path has no file name: {}", source.display())))?;
    let destination = quarantine_dir.join(name);

    if fs::rename(source, &destination).is_err() {
        fs::copy(source, &destination).map_err(|e| {
            SiloError::Io(format!(
                "Failed to quarantine {} to {}: {}",
                source.display(),
                destination.display(),
                e
            ))
        })?;
        fs::remove_file(source).map_err(|e| {
            SiloError::Io(format!(
                "Failed to remove {} after quarantine copy: {}",
                source.display(),
                e
            ))
        })?;
    }

    tracing::warn!(
        source = %source.display(),
        destination = %destination.display(),
        "Quarantined failed file"
    );
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_quarantine_moves_file() {
        let landing = TempDir::new().unwrap();
        let quarantine = TempDir::new().unwrap();
        let source = landing.path().join("loans_20240105.csv");
        fs::write(&source, "broken").unwrap();

        let destination = quarantine_file(&source, quarantine.path()).unwrap();

        assert!(!source.exists());
        assert_eq!(destination, quarantine.path().join("loans_20240105.csv"));
        assert_eq!(fs::read_to_string(destination).unwrap(), "broken");
    }

    #[test]
    fn test_quarantine_creates_directory() {
        let landing = TempDir::new().unwrap();
        let quarantine = TempDir::new().unwrap();
        let nested = quarantine.path().join("failed_files");
        let source = landing.path().join("x.csv");
        fs::write(&source, "x").unwrap();

        quarantine_file(&source, &nested).unwrap();
        assert!(nested.join("x.csv").exists());
    }

    #[test]
    fn test_missing_source_is_error() {
        let quarantine = TempDir::new().unwrap();
        let result = quarantine_file(Path::new("/nonexistent/x.csv"), quarantine.path());
        assert!(result.is_err());
    }
}
