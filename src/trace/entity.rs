//! Trace entities
//!
//! A trace entity is a node in the configured trace graph: either a truth
//! entity (a source-of-record item type such as "SystemRequirement") or a
//! document the truth items must trace into. Within the registered set the
//! ID, name, and abbreviation are each unique, so any of the three can be
//! used as a lookup key.

use serde::{Deserialize, Serialize};

/// What role an entity plays in the trace graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceEntityKind {
    /// Source-of-record item type (requirement, test, risk, ...)
    Truth,
    /// Generated document truth items trace into
    Document,
    /// Pseudo-entity for eliminated item reports
    Eliminated,
    /// Catch-all for unrecognized references
    Unknown,
}

/// A node in the trace graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntity {
    /// Stable identifier, referenced by trace rules
    pub id: String,

    /// Full display name, used in rendered reports
    pub name: String,

    /// Short form used by embedded document tags
    pub abbreviation: String,

    /// Role in the trace graph
    pub kind: TraceEntityKind,
}

impl TraceEntity {
    /// Create an entity
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        kind: TraceEntityKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            abbreviation: abbreviation.into(),
            kind,
        }
    }

    /// True when `key` matches the ID, name, or abbreviation
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.name == key || self.abbreviation == key
    }
}

impl std::fmt::Display for TraceEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_any_property() {
        let entity = TraceEntity::new(
            "SystemRequirement",
            "System Requirement",
            "SYS",
            TraceEntityKind::Truth,
        );
        assert!(entity.matches("SystemRequirement"));
        assert!(entity.matches("System Requirement"));
        assert!(entity.matches("SYS"));
        assert!(!entity.matches("sys"));
    }
}
