//! State management for incremental ingestion
//!
//! Tracks, per entity, which cursor-column values have already been durably
//! ingested, and filters arriving batches down to the genuinely new rows.
//!
//! # Modules
//!
//! - [`cursor`] - The two cursor shapes (watermark, seen set) and their algebra
//! - [`store`] - Per-entity slots, filtering, and JSON persistence

pub mod cursor;
pub mod store;

pub use cursor::EntityCursor;
pub use store::{CursorDocument, FilterOutcome, StateStore};
