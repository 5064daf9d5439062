//! Trace matrix projection
//!
//! Renders a [`TraceMatrix`] as a pipe-table report followed by the trace
//! issue narrative. Which items appear is controlled by an [`ItemInclusion`]
//! predicate; the default filters on the item project when the report
//! requests one.

use thiserror::Error;

use crate::core::item::Item;
use crate::core::plugin::DataSources;
use crate::trace::analysis::{AnalysisError, TraceMatrix, TraceabilityAnalysis};
use crate::trace::issue::{TraceIssue, TraceIssueKind};
use crate::trace::tag::{Tag, TagError};

/// Errors raised while rendering a trace matrix tag
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

fn project_allows(item: &Item, project_filter: Option<&str>) -> bool {
    match project_filter {
        None => true,
        Some(filter) => {
            !item.project.is_empty() && item.project.eq_ignore_ascii_case(filter)
        }
    }
}

/// Decides which items appear in a rendered matrix
pub trait ItemInclusion {
    /// Default: case-insensitive project match; items without a project are
    /// excluded whenever a filter is given
    fn should_include(&self, item: &Item, project_filter: Option<&str>) -> bool {
        project_allows(item, project_filter)
    }
}

/// The default project-only inclusion predicate
#[derive(Debug, Default)]
pub struct DefaultInclusion;

impl ItemInclusion for DefaultInclusion {}

/// Inclusion predicate that also drops items in the listed statuses
#[derive(Debug, Default)]
pub struct StatusInclusion {
    excluded_statuses: Vec<String>,
}

impl StatusInclusion {
    pub fn new(excluded_statuses: Vec<String>) -> Self {
        Self { excluded_statuses }
    }
}

impl ItemInclusion for StatusInclusion {
    fn should_include(&self, item: &Item, project_filter: Option<&str>) -> bool {
        let status_ok = !self
            .excluded_statuses
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&item.status));
        status_ok && project_allows(item, project_filter)
    }
}

/// Renders trace matrices as pipe-table text reports
pub struct TraceMatrixRenderer {
    inclusion: Box<dyn ItemInclusion>,
}

impl Default for TraceMatrixRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceMatrixRenderer {
    /// Renderer with the default project-only inclusion predicate
    pub fn new() -> Self {
        Self {
            inclusion: Box::new(DefaultInclusion),
        }
    }

    /// Renderer with a custom inclusion predicate
    pub fn with_inclusion(inclusion: Box<dyn ItemInclusion>) -> Self {
        Self { inclusion }
    }

    /// Render the matrix table plus the issue narrative
    ///
    /// Root rows whose item the predicate excludes are dropped entirely;
    /// excluded target items vacate their cell to `N/A`.
    pub fn render(
        &self,
        analysis: &TraceabilityAnalysis,
        data: &DataSources,
        matrix: &TraceMatrix,
        project_filter: Option<&str>,
    ) -> String {
        let mut out = String::new();
        out.push_str("|====\n");
        for column in matrix.columns() {
            out.push_str(&format!("| {} ", column.entity.name));
        }
        out.push_str("| Status\n");

        for row in 0..matrix.row_count() {
            let root_item = matrix.columns()[0].rows[row].first().and_then(|c| c.as_ref());
            let included = root_item
                .map(|item| self.inclusion.should_include(item, project_filter))
                .unwrap_or(false);
            if !included {
                continue;
            }

            let mut trace_complete = true;
            let mut line = String::new();
            for column in matrix.columns() {
                let cell = &column.rows[row];
                if cell.is_empty() {
                    line.push_str("| N/A ");
                    continue;
                }
                let mut entries: Vec<String> = Vec::new();
                for entry in cell {
                    match entry {
                        Some(item) => {
                            if self.inclusion.should_include(item, project_filter) {
                                entries.push(item.reference());
                            }
                        }
                        None => {
                            entries.push("MISSING".to_string());
                            trace_complete = false;
                        }
                    }
                }
                if entries.is_empty() {
                    line.push_str("| N/A ");
                } else {
                    line.push_str(&format!("| {} ", entries.join(", ")));
                }
            }
            let status = if trace_complete {
                "Trace Present"
            } else {
                "Trace Missing"
            };
            out.push_str(&line);
            out.push_str(&format!("| {}\n", status));
        }
        out.push_str("|====\n");

        out.push_str("\nTrace issues:\n\n");
        let mut issues_found = false;
        for column in matrix.columns() {
            for issue in analysis.issues_for(&column.entity) {
                issues_found = true;
                out.push_str(&issue_sentence(issue, data));
                out.push('\n');
            }
        }
        if !issues_found {
            out.push_str(&format!(
                "* No {} level trace problems detected!\n",
                matrix.root().name
            ));
        }
        out
    }
}

/// One templated narrative sentence per issue
fn issue_sentence(issue: &TraceIssue, data: &DataSources) -> String {
    // prefer the url[id] reference when the item is live
    let source_id = data
        .item(&issue.source_id)
        .map_or_else(|| issue.source_id.clone(), Item::reference);
    let source = &issue.source.name;
    let target = &issue.target.name;
    match issue.kind {
        TraceIssueKind::Extra => format!(
            ". An item with identifier {source_id} appeared in {source} without tracing to {target}."
        ),
        TraceIssueKind::Missing => {
            format!(". An expected trace from {source_id} in {source} to {target} is missing.")
        }
        TraceIssueKind::PossiblyExtra => format!(
            ". A possibly extra item with identifier {source_id} appeared in {source} without appearing in {target}."
        ),
        TraceIssueKind::PossiblyMissing => format!(
            ". A possibly expected trace from {source_id} in {source} to {target} is missing."
        ),
        TraceIssueKind::Incorrect => match &issue.target_id {
            Some(target_id) => {
                let target_id = data
                    .item(target_id)
                    .map_or_else(|| target_id.clone(), Item::reference);
                format!(
                    ". An incorrect trace was found in {source} from {source_id} to {target_id} where {target_id} was expected in {target} but was not found."
                )
            }
            None => format!(
                ". A missing trace was detected in {source}. The item with ID {source_id} does not have a parent while it was expected to trace to {target}."
            ),
        },
    }
}

/// Handle a `@@SLMS:TraceMatrix(source=...)@@` tag
///
/// Runs the analysis for the tag's source entity and renders the result.
/// The optional `ItemProject` parameter filters rows by project; sort
/// parameters are accepted but left to the document formatting layer.
pub fn render_trace_matrix_tag(
    analysis: &mut TraceabilityAnalysis,
    data: &DataSources,
    tag: &Tag,
) -> Result<String, RenderError> {
    let source_key = tag.parameter("source").ok_or_else(|| TagError::Malformed {
        text: tag.raw.clone(),
    })?;
    let root = analysis
        .graph()
        .entity_for_any_property(source_key)
        .cloned()
        .ok_or_else(|| TagError::UnknownEntity {
            key: source_key.to_string(),
        })?;
    let project_filter = tag.parameter("ItemProject").map(str::to_string);

    let matrix = analysis.perform_analysis(data, &root)?;
    let renderer = TraceMatrixRenderer::new();
    Ok(renderer.render(analysis, data, &matrix, project_filter.as_deref()))
}
