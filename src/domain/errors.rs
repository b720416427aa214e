//! Domain error types
//!
//! This module defines the error hierarchy for Silo. All errors are
//! domain-specific and don't expose third-party types. Note that "nothing new
//! after filtering" is deliberately NOT an error: benign exhaustion is a typed
//! outcome (see [`crate::core::pipeline::FileOutcome`]).

use thiserror::Error;

/// Main Silo error type
///
/// This is the primary error type used throughout the application.
/// Any of these raised while processing a file quarantines that file only;
/// ingestion of subsequent files continues.
#[derive(Debug, Error)]
pub enum SiloError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File extension has no registered extractor
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Filename resolves to an entity with no registered handler
    #[error("Unsupported entity: {0}")]
    UnsupportedEntity(String),

    /// Schema validation failure (missing column or failed type coercion)
    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    /// Extraction errors (unreadable or malformed input)
    #[error("Extract error: {0}")]
    Extract(String),

    /// Transformation errors
    #[error("Transform error: {0}")]
    Transform(String),

    /// Load errors
    #[error("Load error: {0}")]
    Load(String),

    /// Cursor state persistence errors
    #[error("State error: {0}")]
    State(String),

    /// Notification dispatch errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for SiloError {
    fn from(err: std::io::Error) -> Self {
        SiloError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SiloError {
    fn from(err: serde_json::Error) -> Self {
        SiloError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SiloError {
    fn from(err: toml::de::Error) -> Self {
        SiloError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silo_error_display() {
        let err = SiloError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = SiloError::UnsupportedFormat("xml".to_string());
        assert_eq!(err.to_string(), "Unsupported format: xml");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let silo_err: SiloError = io_err.into();
        assert!(matches!(silo_err, SiloError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let silo_err: SiloError = json_err.into();
        assert!(matches!(silo_err, SiloError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let silo_err: SiloError = toml_err.into();
        assert!(matches!(silo_err, SiloError::Configuration(_)));
        assert!(silo_err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_silo_error_implements_std_error() {
        let err = SiloError::SchemaValidation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
