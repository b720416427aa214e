//! Configuration management for Silo.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use silo::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("silo.toml")?;
//!
//! println!("Landing dir: {}", config.landing.base_dir);
//! for entity in &config.entities {
//!     println!("{} tracks {}", entity.name, entity.cursor_column);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [landing]
//! base_dir = "/data/incoming"
//! poll_interval_ms = 1000
//! queue_capacity = 256
//!
//! [staging]
//! base_dir = "/stage"
//!
//! [quarantine]
//! dir = "/data/failed_files"
//!
//! [state]
//! dir = "/var/lib/silo/state"
//!
//! [cipher]
//! dictionary_path = "support/english_words.txt"
//!
//! [[entities]]
//! name = "loans"
//! cursor_column = "utilization_date"
//! cursor_mode = "watermark"
//! cipher_column = "loan_reason"
//!
//! [entities.columns]
//! customer_id = "str"
//! loan_type = "str"
//! amount_utilized = "float"
//! utilization_date = "datetime"
//! loan_reason = "str"
//! ```
//!
//! # Environment Variables
//!
//! Any setting can be overridden with a `SILO_`-prefixed variable, e.g.
//! `SILO_LANDING_BASE_DIR` or `SILO_APPLICATION_LOG_LEVEL`.

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CipherConfig, ColumnType, CursorMode, EntityConfig, ExtractConfig,
    LandingConfig, LoggingConfig, NotifyConfig, QuarantineConfig, SiloConfig, StagingConfig,
    StateConfig,
};
