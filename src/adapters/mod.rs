//! Adapters for the outside edges of the pipeline
//!
//! Everything that touches a source or destination beyond the landing area
//! lives here: format extractors, the staging loader, and the failure
//! notifier. Core stages (validate, state, transform) stay free of I/O
//! concerns beyond the state store's own persistence.

pub mod extract;
pub mod load;
pub mod notify;
