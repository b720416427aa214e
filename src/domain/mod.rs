//! Domain models and types for Silo.
//!
//! This module contains the core domain models, types, and business rules.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`EntityName`], [`CursorColumn`])
//! - **Tabular batch model** ([`Batch`])
//! - **Work item resolution** ([`WorkItem`], [`FileFormat`])
//! - **Error types** ([`SiloError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Silo uses the newtype pattern for identifiers to prevent mixing different
//! name-like strings:
//!
//! ```rust
//! use silo::domain::{EntityName, CursorColumn};
//!
//! # fn example() -> Result<(), String> {
//! let entity = EntityName::new("loans")?;
//! let column = CursorColumn::new("utilization_date")?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod errors;
pub mod ids;
pub mod result;
pub mod work_item;

// Re-export commonly used types for convenience
pub use batch::{cursor_string, Batch};
pub use errors::SiloError;
pub use ids::{CursorColumn, EntityName};
pub use result::Result;
pub use work_item::{FileFormat, WorkItem};
