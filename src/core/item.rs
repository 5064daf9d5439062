//! Item model - the shared vocabulary of the traceability engine
//!
//! An [`Item`] is any entity a data source plugin contributes: a requirement,
//! a test, a risk, a SOUP entry, and so on. The kinds differ only in their
//! payload; linking and trace analysis treat them uniformly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::link::{ItemLink, LinkType};

/// Discriminant for the ten item collections every plugin exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    SystemRequirement,
    SoftwareRequirement,
    DocumentationRequirement,
    DocContent,
    SoftwareSystemTest,
    Anomaly,
    Risk,
    Soup,
    UnitTest,
    TestResult,
}

impl ItemKind {
    /// All kinds, in the order plugins are drained
    pub const ALL: [ItemKind; 10] = [
        ItemKind::SystemRequirement,
        ItemKind::SoftwareRequirement,
        ItemKind::DocumentationRequirement,
        ItemKind::DocContent,
        ItemKind::SoftwareSystemTest,
        ItemKind::Anomaly,
        ItemKind::Risk,
        ItemKind::Soup,
        ItemKind::UnitTest,
        ItemKind::TestResult,
    ];
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ItemKind::SystemRequirement => "SystemRequirement",
            ItemKind::SoftwareRequirement => "SoftwareRequirement",
            ItemKind::DocumentationRequirement => "DocumentationRequirement",
            ItemKind::DocContent => "DocContent",
            ItemKind::SoftwareSystemTest => "SoftwareSystemTest",
            ItemKind::Anomaly => "Anomaly",
            ItemKind::Risk => "Risk",
            ItemKind::Soup => "SOUP",
            ItemKind::UnitTest => "UnitTest",
            ItemKind::TestResult => "TestResult",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    /// Parses the spelling used for truth entity IDs in project configuration
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SystemRequirement" => Ok(ItemKind::SystemRequirement),
            "SoftwareRequirement" => Ok(ItemKind::SoftwareRequirement),
            "DocumentationRequirement" => Ok(ItemKind::DocumentationRequirement),
            "DocContent" => Ok(ItemKind::DocContent),
            "SoftwareSystemTest" => Ok(ItemKind::SoftwareSystemTest),
            "Anomaly" => Ok(ItemKind::Anomaly),
            "Risk" => Ok(ItemKind::Risk),
            "SOUP" => Ok(ItemKind::Soup),
            "UnitTest" | "SoftwareUnitTest" => Ok(ItemKind::UnitTest),
            "TestResult" => Ok(ItemKind::TestResult),
            _ => Err(format!("Unknown item kind: {}", s)),
        }
    }
}

/// Requirement level within the item taxonomy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementLevel {
    #[default]
    System,
    Software,
    Documentation,
}

/// Kind-specific payload carried by an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemDetail {
    Requirement {
        level: RequirementLevel,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        description: String,
    },
    DocContent {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        content: String,
    },
    SystemTest {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        description: String,
        #[serde(default)]
        automated: bool,
    },
    Anomaly {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        severity: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        justification: String,
    },
    Risk {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        hazard: String,
        #[serde(default)]
        severity: u32,
        #[serde(default)]
        occurrence: u32,
        #[serde(default)]
        detectability: u32,
    },
    Soup {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        manufacturer: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        version: String,
    },
    UnitTest {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        purpose: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        acceptance_criteria: String,
    },
    TestResult {
        passed: bool,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        message: String,
    },
}

/// A data item contributed by a plugin
///
/// Identity is the `id` string, unique within a run across all plugins.
/// Links are ordered; the link updater guarantees no two links on the same
/// item share `(target_id, link_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub id: String,

    /// Short title
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// Category as assigned by the originating tracker (user-defined)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    /// Status as reported by the originating tracker
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,

    /// Project the item belongs to, empty when the tracker has no projects
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,

    /// Revision marker from the originating tracker
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub revision: String,

    /// Last modification time, when the tracker reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    /// Browsable location of the item, used when rendering references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Kind-specific payload
    pub detail: ItemDetail,

    /// Outgoing typed links
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    links: Vec<ItemLink>,
}

impl Item {
    /// Create a new item with the given identity and payload
    pub fn new(id: impl Into<String>, title: impl Into<String>, detail: ItemDetail) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: String::new(),
            status: String::new(),
            project: String::new(),
            revision: String::new(),
            last_updated: None,
            url: None,
            detail,
            links: Vec::new(),
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the project
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Set the browsable URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Add an outgoing link, and return self (fixture building)
    pub fn with_link(mut self, target_id: impl Into<String>, link_type: LinkType) -> Self {
        self.add_link(ItemLink::new(target_id, link_type));
        self
    }

    /// The item kind, derived from the payload
    pub fn kind(&self) -> ItemKind {
        match &self.detail {
            ItemDetail::Requirement { level, .. } => match level {
                RequirementLevel::System => ItemKind::SystemRequirement,
                RequirementLevel::Software => ItemKind::SoftwareRequirement,
                RequirementLevel::Documentation => ItemKind::DocumentationRequirement,
            },
            ItemDetail::DocContent { .. } => ItemKind::DocContent,
            ItemDetail::SystemTest { .. } => ItemKind::SoftwareSystemTest,
            ItemDetail::Anomaly { .. } => ItemKind::Anomaly,
            ItemDetail::Risk { .. } => ItemKind::Risk,
            ItemDetail::Soup { .. } => ItemKind::Soup,
            ItemDetail::UnitTest { .. } => ItemKind::UnitTest,
            ItemDetail::TestResult { .. } => ItemKind::TestResult,
        }
    }

    /// Read-only view of the outgoing links, in insertion order
    pub fn links(&self) -> &[ItemLink] {
        &self.links
    }

    /// Add an outgoing link; exact duplicates of `(target_id, link_type)`
    /// are ignored
    pub fn add_link(&mut self, link: ItemLink) {
        if !self.has_link(&link.target_id, link.link_type) {
            self.links.push(link);
        }
    }

    /// Remove the link matching `(target_id, link_type)`, returning whether
    /// anything was removed
    pub fn remove_link(&mut self, target_id: &str, link_type: LinkType) -> bool {
        let before = self.links.len();
        self.links
            .retain(|l| !(l.target_id == target_id && l.link_type == link_type));
        self.links.len() != before
    }

    /// Whether an outgoing link `(target_id, link_type)` exists
    pub fn has_link(&self, target_id: &str, link_type: LinkType) -> bool {
        self.links
            .iter()
            .any(|l| l.target_id == target_id && l.link_type == link_type)
    }

    /// All outgoing links pointing at `target_id`, regardless of type
    pub fn links_to<'a>(&'a self, target_id: &'a str) -> impl Iterator<Item = &'a ItemLink> {
        self.links.iter().filter(move |l| l.target_id == target_id)
    }

    /// Reference rendering: `url[id]` when a URL is known, the bare id
    /// otherwise
    pub fn reference(&self) -> String {
        match &self.url {
            Some(url) => format!("{}[{}]", url, self.id),
            None => self.id.clone(),
        }
    }
}

/// Shorthand constructors for the common fixture kinds
impl Item {
    /// A requirement item at the given level
    pub fn requirement(id: impl Into<String>, level: RequirementLevel) -> Self {
        Item::new(
            id,
            "",
            ItemDetail::Requirement {
                level,
                description: String::new(),
            },
        )
    }

    /// A software system test item
    pub fn system_test(id: impl Into<String>) -> Self {
        Item::new(
            id,
            "",
            ItemDetail::SystemTest {
                description: String::new(),
                automated: false,
            },
        )
    }

    /// A risk item
    pub fn risk(id: impl Into<String>) -> Self {
        Item::new(
            id,
            "",
            ItemDetail::Risk {
                hazard: String::new(),
                severity: 0,
                occurrence: 0,
                detectability: 0,
            },
        )
    }

    /// An anomaly item
    pub fn anomaly(id: impl Into<String>) -> Self {
        Item::new(
            id,
            "",
            ItemDetail::Anomaly {
                severity: String::new(),
                justification: String::new(),
            },
        )
    }

    /// A unit test item
    pub fn unit_test(id: impl Into<String>) -> Self {
        Item::new(
            id,
            "",
            ItemDetail::UnitTest {
                purpose: String::new(),
                acceptance_criteria: String::new(),
            },
        )
    }

    /// A documentation content item
    pub fn doc_content(id: impl Into<String>) -> Self {
        Item::new(
            id,
            "",
            ItemDetail::DocContent {
                content: String::new(),
            },
        )
    }
}
