//! Configuration schema types
//!
//! This module defines the configuration structure for Silo. The root
//! [`SiloConfig`] maps one-to-one to the `silo.toml` file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cursor shape for an entity
///
/// The shape is an explicit, declared property of each entity. It is never
/// inferred from persisted data, so a live cursor can't flip shape when the
/// number of distinct values happens to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorMode {
    /// Scalar high-watermark; rows survive filtering when strictly greater
    Watermark,
    /// Dedup set of every value ever ingested
    SeenSet,
}

/// Declared column type for schema validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Free text
    Str,
    /// Integer
    Int,
    /// Floating point
    Float,
    /// Date-like; coerced to canonical `YYYY-MM-DD` during validation
    Datetime,
}

/// Main Silo configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiloConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Landing area and watcher settings
    pub landing: LandingConfig,

    /// Staging destination settings
    pub staging: StagingConfig,

    /// Quarantine directory settings
    pub quarantine: QuarantineConfig,

    /// Cursor state persistence settings
    pub state: StateConfig,

    /// Extractor settings
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Cipher engine settings
    #[serde(default)]
    pub cipher: CipherConfig,

    /// Failure notification settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-entity handler declarations
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl SiloConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.landing.validate()?;
        self.logging.validate()?;

        if self.entities.is_empty() {
            return Err("At least one [[entities]] entry is required".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for entity in &self.entities {
            entity.validate()?;
            if !seen.insert(entity.name.as_str()) {
                return Err(format!("Duplicate entity name: {}", entity.name));
            }
            if entity.cipher_column.is_some() && self.cipher.dictionary_path.is_none() {
                return Err(format!(
                    "Entity {} declares cipher_column but [cipher] dictionary_path is not set",
                    entity.name
                ));
            }
        }
        Ok(())
    }

    /// Looks up the declaration for an entity by name
    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Landing area and watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingConfig {
    /// Base directory producers drop files into, partitioned as
    /// `<base>/<YYYY-MM-DD>/<HH>/<entity>_<timestamp>.<ext>`
    pub base_dir: String,

    /// Sleep interval for both polling loops when idle, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Work queue depth; the scan loop pauses when the queue is full
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl LandingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_dir.trim().is_empty() {
            return Err("landing.base_dir cannot be empty".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("landing.poll_interval_ms must be greater than zero".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("landing.queue_capacity must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Staging destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Base directory loaded batches land in, as `<base>/<entity>/<file-stem>`
    pub base_dir: String,
}

/// Quarantine directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineConfig {
    /// Flat directory failed source files are moved into, keeping their name
    pub dir: String,
}

/// Cursor state persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory holding one JSON cursor document per entity
    pub dir: String,
}

/// Extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Field delimiter for `.txt` files
    #[serde(default = "default_txt_delimiter")]
    pub txt_delimiter: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            txt_delimiter: default_txt_delimiter(),
        }
    }
}

/// Cipher engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CipherConfig {
    /// Word-list file backing ciphertext-only key recovery; required when
    /// any entity declares a cipher_column
    #[serde(default)]
    pub dictionary_path: Option<String>,
}

/// Failure notification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Recipient passed to the notifier on pipeline failures
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable rolling file output in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for rolling log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation cadence: "daily" or "hourly"
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !["daily", "hourly"].contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be 'daily' or 'hourly'",
                self.local_rotation
            ));
        }
        Ok(())
    }
}

/// Per-entity handler declaration
///
/// Everything the orchestrator needs to route a file for this entity:
/// cursor column and shape, required columns with types, and the optional
/// free-text column to obfuscate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity name, matched against the landing filename stem
    pub name: String,

    /// Column the incremental cursor tracks
    pub cursor_column: String,

    /// Declared cursor shape (watermark or seen_set)
    pub cursor_mode: CursorMode,

    /// Required columns and their declared types
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnType>,

    /// Free-text column obfuscated by the cipher engine during transform
    #[serde(default)]
    pub cipher_column: Option<String>,
}

impl EntityConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Entity name cannot be empty".to_string());
        }
        if self.cursor_column.trim().is_empty() {
            return Err(format!("Entity {} has an empty cursor_column", self.name));
        }
        if !self.columns.is_empty() && !self.columns.contains_key(&self.cursor_column) {
            return Err(format!(
                "Entity {} cursor_column '{}' is not among its declared columns",
                self.name, self.cursor_column
            ));
        }
        if let Some(ref cipher_column) = self.cipher_column {
            if !self.columns.is_empty() && !self.columns.contains_key(cipher_column) {
                return Err(format!(
                    "Entity {} cipher_column '{}' is not among its declared columns",
                    self.name, cipher_column
                ));
            }
        }
        Ok(())
    }

    /// Columns declared as datetime, the ones validation coerces
    pub fn date_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, ty)| **ty == ColumnType::Datetime)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_queue_capacity() -> usize {
    256
}

fn default_txt_delimiter() -> String {
    "|".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}
