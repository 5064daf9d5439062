//! Typed links between items
//!
//! Every link type has a complement: if item A carries `(B, Child)`, a fully
//! normalized data set has `(A, Parent)` on item B. `Related` is its own
//! complement. The link updater relies on this table to mirror links.

use serde::{Deserialize, Serialize};

/// The kind of relationship an item link expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Points at a child item (decomposition)
    Child,
    /// Points at a parent item (reciprocal of `Child`)
    Parent,
    /// Points at the item this test verifies
    Tests,
    /// Points at a test verifying this item (reciprocal of `Tests`)
    TestedBy,
    /// Points from a risk control back at its risk
    Risk,
    /// Points from a risk at one of its controls (reciprocal of `Risk`)
    RiskControl,
    /// Points at documentation content describing this item
    Doc,
    /// Points from documentation content back at the items it documents
    DocumentedBy,
    /// Points at a unit test covering this item
    UnitTest,
    /// Points from a unit test back at the items it covers
    UnitTests,
    /// Points from a test at its result
    Result,
    /// Points from a test result back at its test
    ResultOf,
    /// Symmetric free-form association
    Related,
}

impl LinkType {
    /// The link type the target item must carry back to the source
    pub fn complement(self) -> LinkType {
        match self {
            LinkType::Child => LinkType::Parent,
            LinkType::Parent => LinkType::Child,
            LinkType::Tests => LinkType::TestedBy,
            LinkType::TestedBy => LinkType::Tests,
            LinkType::Risk => LinkType::RiskControl,
            LinkType::RiskControl => LinkType::Risk,
            LinkType::Doc => LinkType::DocumentedBy,
            LinkType::DocumentedBy => LinkType::Doc,
            LinkType::UnitTest => LinkType::UnitTests,
            LinkType::UnitTests => LinkType::UnitTest,
            LinkType::Result => LinkType::ResultOf,
            LinkType::ResultOf => LinkType::Result,
            LinkType::Related => LinkType::Related,
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LinkType::Child => "Child",
            LinkType::Parent => "Parent",
            LinkType::Tests => "Tests",
            LinkType::TestedBy => "TestedBy",
            LinkType::Risk => "Risk",
            LinkType::RiskControl => "RiskControl",
            LinkType::Doc => "DOC",
            LinkType::DocumentedBy => "DocumentedBy",
            LinkType::UnitTest => "UnitTest",
            LinkType::UnitTests => "UnitTests",
            LinkType::Result => "Result",
            LinkType::ResultOf => "ResultOf",
            LinkType::Related => "Related",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for LinkType {
    type Err = String;

    /// Parses the spelling used in project configuration files,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "child" => Ok(LinkType::Child),
            "parent" => Ok(LinkType::Parent),
            "tests" => Ok(LinkType::Tests),
            "testedby" => Ok(LinkType::TestedBy),
            "risk" => Ok(LinkType::Risk),
            "riskcontrol" => Ok(LinkType::RiskControl),
            "doc" => Ok(LinkType::Doc),
            "documentedby" => Ok(LinkType::DocumentedBy),
            "unittest" => Ok(LinkType::UnitTest),
            "unittests" => Ok(LinkType::UnitTests),
            "result" => Ok(LinkType::Result),
            "resultof" => Ok(LinkType::ResultOf),
            "related" => Ok(LinkType::Related),
            _ => Err(format!("Unknown link type: {}", s)),
        }
    }
}

/// A typed reference from one item to another, by target item ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLink {
    /// ID of the item this link points at
    pub target_id: String,

    /// Relationship expressed by the link
    pub link_type: LinkType,
}

impl ItemLink {
    /// Create a new link to `target_id`
    pub fn new(target_id: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            target_id: target_id.into(),
            link_type,
        }
    }
}
