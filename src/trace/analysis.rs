//! Traceability analysis
//!
//! [`TraceabilityAnalysis`] owns the validated trace graph, the explicitly
//! registered trace links, and the issue cache. [`Self::perform_analysis`]
//! walks the graph breadth-first from a root truth entity over an
//! already-normalized item snapshot and materializes a row-aligned
//! [`TraceMatrix`] plus classified [`TraceIssue`]s per visited entity.
//!
//! Cell encoding: an empty cell means the rule did not apply to that row
//! (rendered N/A), a `None` entry means a required trace failed to resolve
//! (rendered MISSING), a `Some` entry is a resolved traced item.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;
use tracing::debug;

use crate::core::item::Item;
use crate::core::plugin::DataSources;
use crate::trace::config::{ConfigError, TraceConfig, TraceGraph, TraceRule};
use crate::trace::entity::{TraceEntity, TraceEntityKind};
use crate::trace::issue::{TraceIssue, TraceIssueKind, TraceLink};
use crate::trace::tag::{Tag, TagError};

/// Errors raised when starting an analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("\"{key}\" is not a registered trace entity")]
    UnknownEntity { key: String },

    #[error("trace analysis must start from a truth entity; \"{id}\" is not one")]
    NotTruthEntity { id: String },
}

/// One materialized column of a trace matrix
#[derive(Debug, Clone)]
pub struct TraceColumn {
    /// The entity this column traces into
    pub entity: TraceEntity,

    /// One cell per root row. See the module docs for the cell encoding.
    pub rows: Vec<Vec<Option<Item>>>,
}

/// The result of one analysis run: root column first, then BFS discovery
/// order
#[derive(Debug, Clone)]
pub struct TraceMatrix {
    root: TraceEntity,
    columns: Vec<TraceColumn>,
}

impl TraceMatrix {
    /// The truth entity the analysis was rooted at
    pub fn root(&self) -> &TraceEntity {
        &self.root
    }

    /// All columns, root first
    pub fn columns(&self) -> &[TraceColumn] {
        &self.columns
    }

    /// Number of rows, equal to the count of live root items
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.rows.len())
    }
}

/// Trace graph walker and issue classifier
pub struct TraceabilityAnalysis {
    graph: TraceGraph,
    trace_links: Vec<TraceLink>,
    issues: HashMap<String, Vec<TraceIssue>>,
}

impl TraceabilityAnalysis {
    /// Validate the configuration and set up the analysis
    pub fn new(config: TraceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            graph: TraceGraph::from_config(config)?,
            trace_links: Vec::new(),
            issues: HashMap::new(),
        })
    }

    /// The validated trace graph
    pub fn graph(&self) -> &TraceGraph {
        &self.graph
    }

    /// Explicitly registered trace links, in registration order
    pub fn trace_links(&self) -> &[TraceLink] {
        &self.trace_links
    }

    /// Register a trace assertion directly
    pub fn add_trace(
        &mut self,
        source: TraceEntity,
        source_id: impl Into<String>,
        target: TraceEntity,
        target_id: impl Into<String>,
    ) {
        self.trace_links
            .push(TraceLink::new(source, source_id, target, target_id));
    }

    /// Register the trace asserted by a `@@Trace:ABBR(id=...)@@` tag found
    /// in the named document
    pub fn add_trace_tag(&mut self, document_title: &str, tag: &Tag) -> Result<(), TagError> {
        let document = self
            .graph
            .entity_by_name(document_title)
            .cloned()
            .ok_or_else(|| TagError::UnknownDocument {
                title: document_title.to_string(),
            })?;
        let entity = self
            .graph
            .entity_by_abbreviation(&tag.name)
            .cloned()
            .ok_or_else(|| TagError::UnknownEntity {
                key: tag.name.clone(),
            })?;
        let id = tag.parameter("id").ok_or_else(|| TagError::MissingId {
            document: document_title.to_string(),
            contents: tag.raw.clone(),
        })?;
        self.add_trace(entity, id, document, id);
        Ok(())
    }

    /// Issues detected for an entity by the most recent analysis that
    /// visited it
    pub fn issues_for(&self, entity: &TraceEntity) -> &[TraceIssue] {
        self.issues.get(&entity.id).map_or(&[], Vec::as_slice)
    }

    /// Walk the trace graph from `root` and materialize the matrix
    ///
    /// Rows are the live items of the root entity's kind, in stable order;
    /// every column is row-aligned with them. Issues found along the way
    /// are cached per visited entity and retrieved via [`Self::issues_for`].
    pub fn perform_analysis(
        &mut self,
        data: &DataSources,
        root: &TraceEntity,
    ) -> Result<TraceMatrix, AnalysisError> {
        let root = self
            .graph
            .entity_by_id(&root.id)
            .cloned()
            .ok_or_else(|| AnalysisError::UnknownEntity {
                key: root.id.clone(),
            })?;
        let root_kind = self
            .graph
            .truth_item_kind(&root)
            .ok_or_else(|| AnalysisError::NotTruthEntity {
                id: root.id.clone(),
            })?;

        let root_rows: Vec<Vec<Option<Item>>> = data
            .items_of_kind(root_kind)
            .into_iter()
            .map(|item| vec![Some(item.clone())])
            .collect();
        debug!(root = %root.id, rows = root_rows.len(), "starting trace analysis");

        let mut columns = vec![TraceColumn {
            entity: root.clone(),
            rows: root_rows,
        }];
        let mut visited: HashSet<String> = HashSet::from([root.id.clone()]);
        let mut queue: VecDeque<usize> = VecDeque::from([0]);
        let mut found: HashMap<String, Vec<TraceIssue>> = HashMap::new();

        while let Some(col_idx) = queue.pop_front() {
            let source = columns[col_idx].entity.clone();
            let rules: Vec<TraceRule> = self.graph.rules_for(&source.id).to_vec();
            for rule in rules {
                if !visited.insert(rule.target_id.clone()) {
                    continue;
                }
                // rule targets were validated at construction
                let Some(target) = self.graph.entity_by_id(&rule.target_id).cloned() else {
                    continue;
                };
                let issues = found.entry(target.id.clone()).or_default();
                let column = match target.kind {
                    TraceEntityKind::Document => self.document_column(
                        data,
                        &columns[col_idx],
                        &source,
                        &target,
                        &rule,
                        issues,
                    ),
                    TraceEntityKind::Truth => {
                        let column = self.truth_column(
                            data,
                            &columns[col_idx],
                            &source,
                            &target,
                            &rule,
                            issues,
                        );
                        self.check_backward_trace(data, &source, &target, &rule, issues);
                        column
                    }
                    _ => continue,
                };
                queue.push_back(columns.len());
                columns.push(column);
            }
        }

        for (entity_id, issues) in found {
            self.issues.insert(entity_id, issues);
        }

        Ok(TraceMatrix {
            root,
            columns,
        })
    }

    /// Build a document column: a cell holds the source item when the
    /// registered trace links confirm it appears in the document, a `None`
    /// when the trace is required but absent. Also flags registered traces
    /// no live truth item justifies.
    fn document_column(
        &self,
        data: &DataSources,
        parent: &TraceColumn,
        source: &TraceEntity,
        document: &TraceEntity,
        rule: &TraceRule,
        issues: &mut Vec<TraceIssue>,
    ) -> TraceColumn {
        let rows = parent
            .rows
            .iter()
            .map(|cell| {
                let mut out = Vec::new();
                for item in cell.iter().flatten() {
                    if !rule.forward.allows(&item.category) {
                        continue;
                    }
                    if self.has_document_trace(source, &item.id, document) {
                        out.push(Some(item.clone()));
                    } else {
                        out.push(None);
                        issues.push(TraceIssue::new(
                            source.clone(),
                            item.id.clone(),
                            document.clone(),
                            Some(item.id.clone()),
                            TraceIssueKind::Missing,
                        ));
                    }
                }
                out
            })
            .collect();

        // traces the document asserts that nothing on the truth side backs
        let source_kind = self.graph.truth_item_kind(source);
        for link in &self.trace_links {
            if link.source.id != source.id || link.target.id != document.id {
                continue;
            }
            let justified = source_kind.is_some_and(|kind| {
                data.items_of_kind(kind).iter().any(|i| i.id == link.source_id)
            });
            if justified {
                continue;
            }
            let kind = if link.source_id == link.target_id {
                TraceIssueKind::Extra
            } else {
                TraceIssueKind::Incorrect
            };
            issues.push(TraceIssue::new(
                document.clone(),
                link.target_id.clone(),
                source.clone(),
                Some(link.source_id.clone()),
                kind,
            ));
        }

        TraceColumn {
            entity: document.clone(),
            rows,
        }
    }

    fn has_document_trace(&self, source: &TraceEntity, item_id: &str, document: &TraceEntity) -> bool {
        self.trace_links.iter().any(|link| {
            (link.source.id == source.id
                && link.source_id == item_id
                && link.target.id == document.id)
                || (link.source.id == document.id
                    && link.target.id == source.id
                    && link.target_id == item_id)
        })
    }

    /// Build a truth-to-truth column by following the rule's forward link
    /// type from every item in the parent column
    fn truth_column(
        &self,
        data: &DataSources,
        parent: &TraceColumn,
        source: &TraceEntity,
        target: &TraceEntity,
        rule: &TraceRule,
        issues: &mut Vec<TraceIssue>,
    ) -> TraceColumn {
        let Some(target_kind) = self.graph.truth_item_kind(target) else {
            return TraceColumn {
                entity: target.clone(),
                rows: vec![Vec::new(); parent.rows.len()],
            };
        };
        let target_items = data.items_of_kind(target_kind);

        let rows = parent
            .rows
            .iter()
            .map(|cell| {
                let mut out = Vec::new();
                for item in cell.iter().flatten() {
                    // category outside the rule: N/A, not an issue
                    if !rule.forward.allows(&item.category) {
                        continue;
                    }
                    let mut resolved_any = false;
                    for link in item.links() {
                        if link.link_type != rule.forward_link {
                            continue;
                        }
                        match target_items.iter().find(|t| t.id == link.target_id) {
                            Some(traced) => {
                                out.push(Some((*traced).clone()));
                                resolved_any = true;
                            }
                            None => {
                                out.push(None);
                                issues.push(TraceIssue::new(
                                    source.clone(),
                                    item.id.clone(),
                                    target.clone(),
                                    Some(link.target_id.clone()),
                                    TraceIssueKind::Missing,
                                ));
                                resolved_any = true;
                            }
                        }
                    }
                    if !resolved_any {
                        out.push(None);
                        // an off-type link to the target entity downgrades
                        // the finding to "possibly missing"
                        let off_type = target_items
                            .iter()
                            .find_map(|t| item.links_to(&t.id).next());
                        match off_type {
                            Some(link) => issues.push(TraceIssue::new(
                                source.clone(),
                                item.id.clone(),
                                target.clone(),
                                Some(link.target_id.clone()),
                                TraceIssueKind::PossiblyMissing,
                            )),
                            None => issues.push(TraceIssue::new(
                                source.clone(),
                                item.id.clone(),
                                target.clone(),
                                Some(item.id.clone()),
                                TraceIssueKind::Missing,
                            )),
                        }
                    }
                }
                out
            })
            .collect();

        TraceColumn {
            entity: target.clone(),
            rows,
        }
    }

    /// Verify the backward direction of a truth-to-truth rule: every target
    /// item whose category the rule covers must connect back to a live
    /// source item via the configured backward link type
    fn check_backward_trace(
        &self,
        data: &DataSources,
        source: &TraceEntity,
        target: &TraceEntity,
        rule: &TraceRule,
        issues: &mut Vec<TraceIssue>,
    ) {
        let (Some(source_kind), Some(target_kind)) = (
            self.graph.truth_item_kind(source),
            self.graph.truth_item_kind(target),
        ) else {
            return;
        };
        let source_items = data.items_of_kind(source_kind);

        for item in data.items_of_kind(target_kind) {
            if !rule.backward.allows(&item.category) {
                continue;
            }
            let mut justified = false;
            let mut stray = false;
            for link in item.links() {
                if link.link_type != rule.backward_link {
                    continue;
                }
                if source_items.iter().any(|s| s.id == link.target_id) {
                    justified = true;
                } else if data.item(&link.target_id).is_none() {
                    // backward link claims an item that exists nowhere
                    stray = true;
                    issues.push(TraceIssue::new(
                        target.clone(),
                        item.id.clone(),
                        source.clone(),
                        Some(link.target_id.clone()),
                        TraceIssueKind::Extra,
                    ));
                }
            }
            if justified || stray {
                continue;
            }
            let off_type = source_items
                .iter()
                .find_map(|s| item.links_to(&s.id).next());
            match off_type {
                Some(link) => issues.push(TraceIssue::new(
                    target.clone(),
                    item.id.clone(),
                    source.clone(),
                    Some(link.target_id.clone()),
                    TraceIssueKind::PossiblyExtra,
                )),
                // no connection to the source entity at all
                None => issues.push(TraceIssue::new(
                    target.clone(),
                    item.id.clone(),
                    source.clone(),
                    None,
                    TraceIssueKind::Incorrect,
                )),
            }
        }
    }
}
