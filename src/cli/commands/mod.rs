//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod ingest;
pub mod init;
pub mod reveal;
pub mod run;
pub mod status;
pub mod validate;
