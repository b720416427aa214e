//! Core pipeline stages and orchestration
//!
//! The stages a batch flows through, plus the machinery that drives them:
//! schema validation, cursor state, transformation, the cipher engine, the
//! landing watcher, and the per-file orchestrator.

pub mod cipher;
pub mod pipeline;
pub mod state;
pub mod transform;
pub mod validate;
pub mod watcher;
