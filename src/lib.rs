// Silo - Incremental File Ingestion Engine
// Copyright (c) 2025 Silo Contributors
// Licensed under the MIT License

//! # Silo - Incremental File Ingestion
//!
//! Silo is a file ingestion engine built in Rust that watches an
//! hour-partitioned landing area, runs each dropped file through a typed
//! pipeline, and loads only the rows that haven't been ingested before.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Watching** a landing area partitioned as `<base>/<YYYY-MM-DD>/<HH>`
//! - **Extracting** CSV, delimited TXT and JSON files into typed batches
//! - **Validating** batches against per-entity declared schemas
//! - **Filtering** rows through per-entity incremental cursors
//! - **Transforming** batches with entity derivations and audit columns
//! - **Loading** results into an entity-partitioned staging area
//!
//! ## Architecture
//!
//! Silo follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (pipeline, state, transform, cipher, watcher)
//! - [`adapters`] - Edges of the pipeline (extractors, loader, notifier)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use silo::config::load_config;
//! use silo::core::pipeline::Orchestrator;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("silo.toml")?;
//! let mut orchestrator = Orchestrator::new(config)?;
//!
//! let outcome = orchestrator.process(Path::new(
//!     "/data/incoming/2024-01-05/14/loans_20240105140000.csv",
//! ))?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Incremental Cursors
//!
//! Each entity declares a cursor column and shape in configuration: a
//! `watermark` (scalar high-water mark) or a `seen_set` (dedup set of every
//! ingested value). Re-delivered files resolve to a benign skip rather than
//! an error:
//!
//! ```rust,no_run
//! use silo::core::state::{FilterOutcome, StateStore};
//! use silo::config::CursorMode;
//! use silo::domain::ids::{CursorColumn, EntityName};
//!
//! # fn example(batch: silo::domain::batch::Batch) -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = StateStore::new("/var/lib/silo/state")?;
//! let entity = EntityName::new("loans")?;
//! let column = CursorColumn::new("utilization_date")?;
//!
//! match store.filter(batch, &entity, &column, CursorMode::Watermark)? {
//!     FilterOutcome::Filtered(new_rows) => { /* transform and load */ }
//!     FilterOutcome::Exhausted => { /* nothing new, skip the file */ }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Silo uses the [`domain::SiloError`] type for all errors. A failure while
//! processing a file quarantines that file only; ingestion continues:
//!
//! ```rust,no_run
//! use silo::domain::SiloError;
//!
//! fn example() -> Result<(), SiloError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = silo::config::load_config("silo.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Silo uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting watcher");
//! warn!(file = "loans_20240105.csv", "File quarantined");
//! error!(error = "missing column", "Schema validation failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
