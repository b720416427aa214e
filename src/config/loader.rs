//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SiloConfig;
use crate::domain::errors::SiloError;
use crate::domain::result::Result;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Parses the TOML into SiloConfig
/// 3. Applies environment variable overrides (SILO_* prefix)
/// 4. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be read, TOML parsing fails, or
/// configuration validation fails.
///
/// # Examples
///
/// ```no_run
/// use silo::config::load_config;
///
/// let config = load_config("silo.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SiloConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SiloError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SiloError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config: SiloConfig = toml::from_str(&contents)
        .map_err(|e| SiloError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| SiloError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Applies environment variable overrides using the SILO_* prefix
///
/// Environment variables follow the pattern: SILO_<SECTION>_<KEY>.
/// For example: SILO_LANDING_BASE_DIR, SILO_APPLICATION_LOG_LEVEL.
fn apply_env_overrides(config: &mut SiloConfig) {
    if let Ok(val) = std::env::var("SILO_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("SILO_LANDING_BASE_DIR") {
        config.landing.base_dir = val;
    }
    if let Ok(val) = std::env::var("SILO_LANDING_POLL_INTERVAL_MS") {
        if let Ok(interval) = val.parse() {
            config.landing.poll_interval_ms = interval;
        }
    }
    if let Ok(val) = std::env::var("SILO_LANDING_QUEUE_CAPACITY") {
        if let Ok(capacity) = val.parse() {
            config.landing.queue_capacity = capacity;
        }
    }

    if let Ok(val) = std::env::var("SILO_STAGING_BASE_DIR") {
        config.staging.base_dir = val;
    }
    if let Ok(val) = std::env::var("SILO_QUARANTINE_DIR") {
        config.quarantine.dir = val;
    }
    if let Ok(val) = std::env::var("SILO_STATE_DIR") {
        config.state.dir = val;
    }

    if let Ok(val) = std::env::var("SILO_CIPHER_DICTIONARY_PATH") {
        config.cipher.dictionary_path = Some(val);
    }
    if let Ok(val) = std::env::var("SILO_NOTIFY_RECIPIENT") {
        config.notify.recipient = Some(val);
    }

    if let Ok(val) = std::env::var("SILO_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("SILO_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
