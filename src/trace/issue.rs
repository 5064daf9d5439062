//! Trace links and trace issues
//!
//! A [`TraceLink`] is an explicit assertion that a document location traces
//! to an item, registered by tag parsing or by the embedding directly. It is
//! distinct from the item-level `ItemLink`s plugins supply. A [`TraceIssue`]
//! records one invalid or unconfirmed trace found during analysis.

use serde::{Deserialize, Serialize};

use crate::trace::entity::TraceEntity;

/// An explicit, registered trace assertion between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLink {
    pub source: TraceEntity,
    pub source_id: String,
    pub target: TraceEntity,
    pub target_id: String,
}

impl TraceLink {
    pub fn new(
        source: TraceEntity,
        source_id: impl Into<String>,
        target: TraceEntity,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            source,
            source_id: source_id.into(),
            target,
            target_id: target_id.into(),
        }
    }
}

/// Classification of a trace problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceIssueKind {
    /// An expected trace does not exist
    Missing,
    /// A trace exists that nothing justifies
    Extra,
    /// A trace exists but points at the wrong item
    Incorrect,
    /// An expected trace exists only with an unexpected link type
    PossiblyMissing,
    /// An unjustified trace exists, but via an unexpected link type
    PossiblyExtra,
}

/// One invalid or unconfirmed trace, as reported by the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceIssue {
    pub source: TraceEntity,
    pub source_id: String,
    pub target: TraceEntity,
    /// ID on the target side. `None` when no candidate item exists at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    pub kind: TraceIssueKind,
}

impl TraceIssue {
    pub fn new(
        source: TraceEntity,
        source_id: impl Into<String>,
        target: TraceEntity,
        target_id: Option<String>,
        kind: TraceIssueKind,
    ) -> Self {
        Self {
            source,
            source_id: source_id.into(),
            target,
            target_id,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::entity::TraceEntityKind;

    #[test]
    fn test_issue_serde_omits_absent_target_id() {
        let truth = TraceEntity::new("SystemRequirement", "System Requirement", "SYS", TraceEntityKind::Truth);
        let doc = TraceEntity::new("Spec", "Specification", "SPC", TraceEntityKind::Document);
        let issue = TraceIssue::new(truth, "SYS-1", doc, None, TraceIssueKind::Incorrect);
        let yaml = serde_yml::to_string(&issue).unwrap();
        assert!(!yaml.contains("target_id"));
        assert!(yaml.contains("kind: incorrect"));
    }
}
