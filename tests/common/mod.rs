//! Shared test helpers for integration tests
//!
//! Standard trace configuration and item fixtures used across the test
//! files: system requirements trace to a specification document and down to
//! software requirements, which trace to their own specification and to
//! system tests, which land in the test plan.

#![allow(dead_code)]

use tracekit::core::{DataSourcePlugin, InMemorySource, Item, LinkType, RequirementLevel};
use tracekit::trace::{
    DocumentConfig, TraceConfig, TraceRuleSpec, TraceabilityAnalysis, TruthEntityConfig,
};

/// The standard three-level trace configuration
pub fn standard_config() -> TraceConfig {
    TraceConfig {
        truth_entities: vec![
            TruthEntityConfig::new("SystemRequirement", "System Requirement", "SYS"),
            TruthEntityConfig::new("SoftwareRequirement", "Software Requirement", "SWR"),
            TruthEntityConfig::new("SoftwareSystemTest", "Software System Test", "TC"),
        ],
        documents: vec![
            DocumentConfig::new(
                "SystemRequirementsSpecification",
                "System Requirements Specification",
                "SRS",
            ),
            DocumentConfig::new(
                "SoftwareRequirementsSpecification",
                "Software Requirements Specification",
                "SWRS",
            ),
            DocumentConfig::new("SystemLevelTestPlan", "System Level Test Plan", "SLTP"),
        ],
        rules: vec![
            TraceRuleSpec::all(
                "SystemRequirement",
                "SystemRequirementsSpecification",
                "DOC",
                "DocumentedBy",
            ),
            TraceRuleSpec::all("SystemRequirement", "SoftwareRequirement", "Child", "Parent"),
            TraceRuleSpec::all(
                "SoftwareRequirement",
                "SoftwareRequirementsSpecification",
                "DOC",
                "DocumentedBy",
            ),
            TraceRuleSpec::all(
                "SoftwareRequirement",
                "SoftwareSystemTest",
                "TestedBy",
                "Tests",
            ),
            TraceRuleSpec::all("SoftwareSystemTest", "SystemLevelTestPlan", "DOC", "DocumentedBy"),
        ],
    }
}

/// Analysis over the standard configuration
pub fn standard_analysis() -> TraceabilityAnalysis {
    TraceabilityAnalysis::new(standard_config()).expect("standard config must validate")
}

/// Box a single source as the plugin set the engine consumes
pub fn boxed(source: InMemorySource) -> Vec<Box<dyn DataSourcePlugin>> {
    vec![Box::new(source)]
}

/// A system requirement fixture
pub fn sys_req(id: &str) -> Item {
    Item::requirement(id, RequirementLevel::System)
}

/// A software requirement fixture, pre-linked to its parent
pub fn sw_req(id: &str, parent_id: &str) -> Item {
    Item::requirement(id, RequirementLevel::Software).with_link(parent_id, LinkType::Parent)
}

/// A system test fixture, pre-linked to the requirement it verifies
pub fn sys_test(id: &str, requirement_id: &str) -> Item {
    Item::system_test(id).with_link(requirement_id, LinkType::Tests)
}
