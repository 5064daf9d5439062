//! Trace graph configuration and validation
//!
//! The configuration layer that parses project files is out of scope here;
//! this module receives already-parsed values ([`TraceConfig`]) and builds
//! the validated [`TraceGraph`] the analysis walks. All validation happens
//! at construction so the analysis itself never has to second-guess the
//! graph.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::item::ItemKind;
use crate::core::link::LinkType;
use crate::trace::entity::{TraceEntity, TraceEntityKind};

/// Which item categories participate in one direction of a trace rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    /// Every category participates
    All,
    /// Only the listed categories participate
    Categories(Vec<String>),
}

impl CategoryFilter {
    /// True when an item with the given category falls under this filter
    pub fn allows(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Categories(categories) => {
                categories.iter().any(|c| c == category)
            }
        }
    }
}

/// A truth entity as declared by the project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthEntityConfig {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
}

impl TruthEntityConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        abbreviation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            abbreviation: abbreviation.into(),
        }
    }
}

/// A document as declared by the project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub id: String,
    pub title: String,
    pub abbreviation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_path: Option<String>,
}

impl DocumentConfig {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        abbreviation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abbreviation: abbreviation.into(),
            template_path: None,
        }
    }
}

/// One trace rule as declared by the project configuration
///
/// Link types arrive as strings here and are parsed during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRuleSpec {
    /// Truth entity the rule traces from
    pub source_id: String,
    /// Document or truth entity the rule traces into
    pub target_id: String,
    /// Categories required to trace forward
    pub forward: CategoryFilter,
    /// Categories required to trace backward
    pub backward: CategoryFilter,
    /// Link type name expected on the forward direction
    pub forward_link: String,
    /// Link type name expected on the backward direction
    pub backward_link: String,
}

impl TraceRuleSpec {
    /// Rule tracing every category in both directions
    pub fn all(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        forward_link: impl Into<String>,
        backward_link: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            forward: CategoryFilter::All,
            backward: CategoryFilter::All,
            forward_link: forward_link.into(),
            backward_link: backward_link.into(),
        }
    }
}

/// The full, unvalidated configuration input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub truth_entities: Vec<TruthEntityConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<DocumentConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<TraceRuleSpec>,
}

/// Errors raised while validating a [`TraceConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate trace entity {property} \"{value}\"")]
    DuplicateEntity {
        property: &'static str,
        value: String,
    },

    #[error("trace rule source \"{source_id}\" is not a declared truth entity")]
    UnknownRuleSource { source_id: String },

    #[error("trace rule from \"{source_id}\" targets unknown entity \"{target_id}\"")]
    UnknownRuleTarget {
        source_id: String,
        target_id: String,
    },

    #[error("truth entity \"{id}\" has no trace rules; it cannot be traced")]
    UntracedTruthEntity { id: String },

    #[error("trace rule from \"{source_id}\" names unknown link type \"{name}\"")]
    UnknownLinkType { source_id: String, name: String },

    #[error("truth entity id \"{id}\" does not name an item kind")]
    UnknownItemKind { id: String },
}

/// A validated trace rule with parsed link types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRule {
    pub target_id: String,
    pub forward: CategoryFilter,
    pub backward: CategoryFilter,
    pub forward_link: LinkType,
    pub backward_link: LinkType,
}

/// The validated trace graph
///
/// Entities in declaration order (truth entities first, then documents) and
/// rules keyed by source truth entity ID, in declaration order.
#[derive(Debug, Clone)]
pub struct TraceGraph {
    entities: Vec<TraceEntity>,
    rules: HashMap<String, Vec<TraceRule>>,
}

impl TraceGraph {
    /// Validate a configuration and build the graph
    pub fn from_config(config: TraceConfig) -> Result<Self, ConfigError> {
        let mut entities: Vec<TraceEntity> = Vec::new();

        for truth in &config.truth_entities {
            truth
                .id
                .parse::<ItemKind>()
                .map_err(|_| ConfigError::UnknownItemKind {
                    id: truth.id.clone(),
                })?;
            Self::check_unique(&entities, &truth.id, &truth.name, &truth.abbreviation)?;
            entities.push(TraceEntity::new(
                &truth.id,
                &truth.name,
                &truth.abbreviation,
                TraceEntityKind::Truth,
            ));
        }

        for doc in &config.documents {
            Self::check_unique(&entities, &doc.id, &doc.title, &doc.abbreviation)?;
            entities.push(TraceEntity::new(
                &doc.id,
                &doc.title,
                &doc.abbreviation,
                TraceEntityKind::Document,
            ));
        }

        let mut rules: HashMap<String, Vec<TraceRule>> = HashMap::new();
        for spec in &config.rules {
            let source_is_truth = entities
                .iter()
                .any(|e| e.id == spec.source_id && e.kind == TraceEntityKind::Truth);
            if !source_is_truth {
                return Err(ConfigError::UnknownRuleSource {
                    source_id: spec.source_id.clone(),
                });
            }
            if !entities.iter().any(|e| e.id == spec.target_id) {
                return Err(ConfigError::UnknownRuleTarget {
                    source_id: spec.source_id.clone(),
                    target_id: spec.target_id.clone(),
                });
            }
            let parse_link = |name: &str| {
                name.parse::<LinkType>()
                    .map_err(|_| ConfigError::UnknownLinkType {
                        source_id: spec.source_id.clone(),
                        name: name.to_string(),
                    })
            };
            rules.entry(spec.source_id.clone()).or_default().push(TraceRule {
                target_id: spec.target_id.clone(),
                forward: spec.forward.clone(),
                backward: spec.backward.clone(),
                forward_link: parse_link(&spec.forward_link)?,
                backward_link: parse_link(&spec.backward_link)?,
            });
        }

        for truth in &config.truth_entities {
            if !rules.contains_key(&truth.id) {
                return Err(ConfigError::UntracedTruthEntity {
                    id: truth.id.clone(),
                });
            }
        }

        Ok(Self { entities, rules })
    }

    fn check_unique(
        entities: &[TraceEntity],
        id: &str,
        name: &str,
        abbreviation: &str,
    ) -> Result<(), ConfigError> {
        for entity in entities {
            if entity.id == id {
                return Err(ConfigError::DuplicateEntity {
                    property: "id",
                    value: id.to_string(),
                });
            }
            if entity.name == name {
                return Err(ConfigError::DuplicateEntity {
                    property: "name",
                    value: name.to_string(),
                });
            }
            if entity.abbreviation == abbreviation {
                return Err(ConfigError::DuplicateEntity {
                    property: "abbreviation",
                    value: abbreviation.to_string(),
                });
            }
        }
        Ok(())
    }

    /// All registered entities, truth entities first
    pub fn entities(&self) -> &[TraceEntity] {
        &self.entities
    }

    /// Look up an entity by ID
    pub fn entity_by_id(&self, id: &str) -> Option<&TraceEntity> {
        let found = self.entities.iter().find(|e| e.id == id);
        if found.is_none() {
            warn!(id, "no trace entity with this id");
        }
        found
    }

    /// Look up an entity by display name
    pub fn entity_by_name(&self, name: &str) -> Option<&TraceEntity> {
        let found = self.entities.iter().find(|e| e.name == name);
        if found.is_none() {
            warn!(name, "no trace entity with this name");
        }
        found
    }

    /// Look up an entity by abbreviation
    pub fn entity_by_abbreviation(&self, abbreviation: &str) -> Option<&TraceEntity> {
        let found = self.entities.iter().find(|e| e.abbreviation == abbreviation);
        if found.is_none() {
            warn!(abbreviation, "no trace entity with this abbreviation");
        }
        found
    }

    /// Look up an entity by ID, then name, then abbreviation
    pub fn entity_for_any_property(&self, key: &str) -> Option<&TraceEntity> {
        let found = self
            .entities
            .iter()
            .find(|e| e.id == key)
            .or_else(|| self.entities.iter().find(|e| e.name == key))
            .or_else(|| self.entities.iter().find(|e| e.abbreviation == key));
        if found.is_none() {
            warn!(key, "no trace entity matches this key");
        }
        found
    }

    /// Rules with the given truth entity as source, in declaration order
    pub fn rules_for(&self, source_id: &str) -> &[TraceRule] {
        self.rules.get(source_id).map_or(&[], Vec::as_slice)
    }

    /// The item kind backing a truth entity. `None` for documents.
    pub fn truth_item_kind(&self, entity: &TraceEntity) -> Option<ItemKind> {
        if entity.kind != TraceEntityKind::Truth {
            return None;
        }
        entity.id.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> TraceConfig {
        TraceConfig {
            truth_entities: vec![TruthEntityConfig::new(
                "SystemRequirement",
                "System Requirement",
                "SYS",
            )],
            documents: vec![DocumentConfig::new(
                "SystemRequirementsSpecification",
                "System Requirements Specification",
                "SRS",
            )],
            rules: vec![TraceRuleSpec::all(
                "SystemRequirement",
                "SystemRequirementsSpecification",
                "DOC",
                "DocumentedBy",
            )],
        }
    }

    #[test]
    fn test_minimal_config_validates() {
        let graph = TraceGraph::from_config(minimal_config()).unwrap();
        assert_eq!(graph.entities().len(), 2);
        assert_eq!(graph.rules_for("SystemRequirement").len(), 1);
        assert_eq!(
            graph.rules_for("SystemRequirement")[0].forward_link,
            LinkType::Doc
        );
    }

    #[test]
    fn test_duplicate_abbreviation_rejected() {
        let mut config = minimal_config();
        config.documents[0].abbreviation = "SYS".to_string();
        let err = TraceGraph::from_config(config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateEntity {
                property: "abbreviation",
                ..
            }
        ));
    }

    #[test]
    fn test_rule_target_must_exist() {
        let mut config = minimal_config();
        config.rules[0].target_id = "NoSuchDocument".to_string();
        let err = TraceGraph::from_config(config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRuleTarget { .. }));
    }

    #[test]
    fn test_truth_entity_without_rules_rejected() {
        let mut config = minimal_config();
        config
            .truth_entities
            .push(TruthEntityConfig::new("Risk", "Risk", "RSK"));
        let err = TraceGraph::from_config(config).unwrap_err();
        assert!(matches!(err, ConfigError::UntracedTruthEntity { .. }));
    }

    #[test]
    fn test_truth_id_must_name_item_kind() {
        let mut config = minimal_config();
        config.truth_entities[0].id = "Widget".to_string();
        let err = TraceGraph::from_config(config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownItemKind { .. }));
    }

    #[test]
    fn test_unknown_link_type_rejected() {
        let mut config = minimal_config();
        config.rules[0].forward_link = "Sibling".to_string();
        let err = TraceGraph::from_config(config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLinkType { .. }));
    }

    #[test]
    fn test_lookup_by_any_property() {
        let graph = TraceGraph::from_config(minimal_config()).unwrap();
        assert!(graph.entity_for_any_property("SYS").is_some());
        assert!(graph
            .entity_for_any_property("System Requirements Specification")
            .is_some());
        assert!(graph.entity_for_any_property("nope").is_none());
    }

    #[test]
    fn test_category_filter() {
        assert!(CategoryFilter::All.allows("anything"));
        let filter = CategoryFilter::Categories(vec!["Safety".to_string()]);
        assert!(filter.allows("Safety"));
        assert!(!filter.allows("Usability"));
    }
}
