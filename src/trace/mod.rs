//! Trace module - trace graph configuration, analysis, and reporting

pub mod analysis;
pub mod config;
pub mod entity;
pub mod issue;
pub mod matrix;
pub mod tag;

pub use analysis::{AnalysisError, TraceColumn, TraceMatrix, TraceabilityAnalysis};
pub use config::{
    CategoryFilter, ConfigError, DocumentConfig, TraceConfig, TraceGraph, TraceRule,
    TraceRuleSpec, TruthEntityConfig,
};
pub use entity::{TraceEntity, TraceEntityKind};
pub use issue::{TraceIssue, TraceIssueKind, TraceLink};
pub use matrix::{
    render_trace_matrix_tag, DefaultInclusion, ItemInclusion, RenderError, StatusInclusion,
    TraceMatrixRenderer,
};
pub use tag::{extract_tags, Tag, TagError};
