//! Integration tests for the rendered trace matrix report

mod common;

use common::*;
use tracekit::core::{DataSources, InMemorySource, LinkType};
use tracekit::trace::{
    render_trace_matrix_tag, StatusInclusion, Tag, TraceMatrixRenderer,
};

#[test]
fn test_report_layout_and_status_column() {
    let mut analysis = standard_analysis();
    let source = InMemorySource::new("tracker")
        .with_item(sys_req("SYS-1").with_link("SWR-1", LinkType::Child))
        .with_item(sys_req("SYS-2"))
        .with_item(sw_req("SWR-1", "SYS-1"));
    let plugins = boxed(source);
    let data = DataSources::new(&plugins);
    let root = analysis
        .graph()
        .entity_by_id("SystemRequirement")
        .unwrap()
        .clone();

    let matrix = analysis.perform_analysis(&data, &root).unwrap();
    let report = TraceMatrixRenderer::new().render(&analysis, &data, &matrix, None);

    assert!(report.starts_with("|====\n"));
    assert!(report.contains("| System Requirement "));
    assert!(report.contains("| System Requirements Specification "));
    assert!(report.contains("| Status\n"));
    // SYS-2 has no document trace and no software decomposition
    assert!(report.contains("MISSING"));
    assert!(report.contains("| Trace Missing\n"));
    assert!(report.contains("Trace issues:"));
    assert!(report.contains(
        "An expected trace from SYS-2 in System Requirement to System Requirements Specification is missing."
    ));
}

#[test]
fn test_clean_project_reports_no_problems() {
    let mut analysis = standard_analysis();
    let source = InMemorySource::new("tracker")
        .with_item(sys_req("SYS-1").with_link("SWR-1", LinkType::Child))
        .with_item(sw_req("SWR-1", "SYS-1").with_link("TC-1", LinkType::TestedBy))
        .with_item(sys_test("TC-1", "SWR-1"));
    let plugins = boxed(source);
    let data = DataSources::new(&plugins);
    let root = analysis
        .graph()
        .entity_by_id("SystemRequirement")
        .unwrap()
        .clone();
    let srs = analysis
        .graph()
        .entity_by_id("SystemRequirementsSpecification")
        .unwrap()
        .clone();
    let swrs = analysis
        .graph()
        .entity_by_id("SoftwareRequirementsSpecification")
        .unwrap()
        .clone();
    let sltp = analysis
        .graph()
        .entity_by_id("SystemLevelTestPlan")
        .unwrap()
        .clone();
    let swr = analysis
        .graph()
        .entity_by_id("SoftwareRequirement")
        .unwrap()
        .clone();
    let tc = analysis
        .graph()
        .entity_by_id("SoftwareSystemTest")
        .unwrap()
        .clone();
    analysis.add_trace(root.clone(), "SYS-1", srs, "SYS-1");
    analysis.add_trace(swr, "SWR-1", swrs, "SWR-1");
    analysis.add_trace(tc, "TC-1", sltp, "TC-1");

    let matrix = analysis.perform_analysis(&data, &root).unwrap();
    let report = TraceMatrixRenderer::new().render(&analysis, &data, &matrix, None);

    assert!(report.contains("| Trace Present\n"));
    assert!(!report.contains("MISSING"));
    assert!(report.contains("* No System Requirement level trace problems detected!"));
}

#[test]
fn test_item_urls_render_as_references() {
    let mut analysis = standard_analysis();
    let source = InMemorySource::new("tracker").with_item(
        sys_req("SYS-1")
            .with_url("https://tracker.example/SYS-1")
            .with_link("SWR-1", LinkType::Child),
    );
    let source = source.with_item(sw_req("SWR-1", "SYS-1"));
    let plugins = boxed(source);
    let data = DataSources::new(&plugins);
    let root = analysis
        .graph()
        .entity_by_id("SystemRequirement")
        .unwrap()
        .clone();

    let matrix = analysis.perform_analysis(&data, &root).unwrap();
    let report = TraceMatrixRenderer::new().render(&analysis, &data, &matrix, None);

    assert!(report.contains("| https://tracker.example/SYS-1[SYS-1] "));
}

#[test]
fn test_project_filter_drops_rows_and_vacates_cells() {
    let mut analysis = standard_analysis();
    let source = InMemorySource::new("tracker")
        .with_item(
            sys_req("SYS-1")
                .with_project("Alpha")
                .with_link("SWR-1", LinkType::Child),
        )
        .with_item(sys_req("SYS-2").with_project("Beta"))
        .with_item(sw_req("SWR-1", "SYS-1").with_project("Beta"));
    let plugins = boxed(source);
    let data = DataSources::new(&plugins);
    let root = analysis
        .graph()
        .entity_by_id("SystemRequirement")
        .unwrap()
        .clone();

    let matrix = analysis.perform_analysis(&data, &root).unwrap();
    let report = TraceMatrixRenderer::new().render(&analysis, &data, &matrix, Some("Alpha"));

    // the issue narrative may still name filtered items; the table must not
    let table = report.split("Trace issues:").next().unwrap();
    // the Beta requirement's row is gone entirely
    assert!(!table.contains("SYS-2"));
    // the row survives but its Beta-project target cell is vacated
    assert!(table.contains("| SYS-1 "));
    assert!(!table.contains("SWR-1"));
    assert!(table.contains("| N/A "));
}

#[test]
fn test_status_inclusion_drops_cancelled_items() {
    let mut analysis = standard_analysis();
    let source = InMemorySource::new("tracker")
        .with_item(sys_req("SYS-1").with_status("Cancelled"))
        .with_item(sys_req("SYS-2").with_status("Approved"));
    let plugins = boxed(source);
    let data = DataSources::new(&plugins);
    let root = analysis
        .graph()
        .entity_by_id("SystemRequirement")
        .unwrap()
        .clone();

    let matrix = analysis.perform_analysis(&data, &root).unwrap();
    let renderer = TraceMatrixRenderer::with_inclusion(Box::new(StatusInclusion::new(vec![
        "Cancelled".to_string(),
    ])));
    let report = renderer.render(&analysis, &data, &matrix, None);

    assert!(!report.contains("| SYS-1 "));
    assert!(report.contains("| SYS-2 "));
}

#[test]
fn test_trace_matrix_tag_drives_rendering() {
    let mut analysis = standard_analysis();
    let source = InMemorySource::new("tracker")
        .with_item(sys_req("SYS-1").with_link("SWR-1", LinkType::Child))
        .with_item(sw_req("SWR-1", "SYS-1"));
    let plugins = boxed(source);
    let data = DataSources::new(&plugins);

    let tag = Tag::parse("@@SLMS:TraceMatrix(source=SystemRequirement)@@").unwrap();
    let report = render_trace_matrix_tag(&mut analysis, &data, &tag).unwrap();
    assert!(report.contains("| System Requirement "));

    let by_abbreviation = Tag::parse("@@SLMS:TraceMatrix(source=SYS)@@").unwrap();
    assert!(render_trace_matrix_tag(&mut analysis, &data, &by_abbreviation).is_ok());

    let no_source = Tag::parse("@@SLMS:TraceMatrix(sortby=ItemID)@@").unwrap();
    assert!(render_trace_matrix_tag(&mut analysis, &data, &no_source).is_err());
}
