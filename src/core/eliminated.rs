//! Elimination records
//!
//! Items removed from the active set are never dropped outright; they are
//! wrapped in an [`EliminatedItem`] so the generated documentation can
//! account for every item the data sources reported.

use serde::{Deserialize, Serialize};

use crate::core::item::Item;

/// Why an item was moved to the eliminated set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationCause {
    /// Removed by the configured inclusion/exclusion filters
    FilteredOut,
    /// Removed because every item it linked to was itself eliminated
    LinkedItemMissing,
    /// Removed because it linked to an item on the ignore list
    IgnoredLinkTarget,
}

impl std::fmt::Display for EliminationCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EliminationCause::FilteredOut => write!(f, "filtered out"),
            EliminationCause::LinkedItemMissing => write!(f, "linked item missing"),
            EliminationCause::IgnoredLinkTarget => write!(f, "ignored link target"),
        }
    }
}

/// An item removed from the active set, with an audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminatedItem {
    /// The item as it was at the moment of elimination
    pub item: Item,

    /// Machine-readable cause
    pub cause: EliminationCause,

    /// Human-readable explanation recorded by whoever eliminated the item
    pub reason: String,
}

impl EliminatedItem {
    /// Wrap `item` with the given elimination record
    pub fn new(item: Item, reason: impl Into<String>, cause: EliminationCause) -> Self {
        Self {
            item,
            cause,
            reason: reason.into(),
        }
    }

    /// ID of the eliminated item
    pub fn id(&self) -> &str {
        &self.item.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::{Item, RequirementLevel};

    #[test]
    fn test_elimination_preserves_item() {
        let item = Item::requirement("REQ-001", RequirementLevel::System).with_category("Safety");
        let eliminated =
            EliminatedItem::new(item.clone(), "filtered by config", EliminationCause::FilteredOut);

        assert_eq!(eliminated.id(), "REQ-001");
        assert_eq!(eliminated.item, item);
        assert_eq!(eliminated.cause, EliminationCause::FilteredOut);
        assert_eq!(eliminated.reason, "filtered by config");
    }
}
