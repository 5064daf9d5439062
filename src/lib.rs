//! tracekit: traceability and link-consistency engine
//!
//! Aggregates requirement, test, risk, and documentation items from data
//! source plugins, normalizes the bidirectional links between them, and
//! verifies the configured trace relationships hold, reporting a trace
//! matrix and classified trace issues for anything that does not.

pub mod core;
pub mod trace;
