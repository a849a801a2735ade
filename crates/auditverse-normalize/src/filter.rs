//! Filtered export
//!
//! Selects a subset of a normalized graph, records what was selected in an
//! export metadata block, and hands the result back in denormalized form.

use crate::convert::to_denormalized;
use crate::error::NormalizeResult;
use auditverse_model::{Collection, EntityId, EntityView, GraphSnapshot};
use chrono::{DateTime, SecondsFormat, Utc};
use im::Vector;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Collections shown in the viewer and eligible for export
pub const EXPORTABLE: [Collection; 7] = [
    Collection::Risks,
    Collection::Controls,
    Collection::Issues,
    Collection::Incidents,
    Collection::Entities,
    Collection::Standards,
    Collection::Audits,
];

/// Active collections and per-collection selections
///
/// Empty selection sets mean "no restriction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphFilter {
    /// Collections to include; `entities` covers business units
    pub active: IndexSet<Collection>,
    /// Risk `category` values to keep
    pub risk_categories: IndexSet<String>,
    /// Business unit ids to keep
    pub units: IndexSet<EntityId>,
    /// Standard ids to keep
    pub standards: IndexSet<EntityId>,
    /// Audit ids to keep
    pub audits: IndexSet<EntityId>,
    /// Cap applied to every exported collection
    pub max_rows: Option<usize>,
}

impl Default for GraphFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl GraphFilter {
    /// Every exportable collection, no selections
    #[must_use]
    pub fn all() -> Self {
        Self::only(EXPORTABLE)
    }

    /// Only the given collections, no selections
    #[must_use]
    pub fn only(collections: impl IntoIterator<Item = Collection>) -> Self {
        Self {
            active: collections.into_iter().collect(),
            risk_categories: IndexSet::new(),
            units: IndexSet::new(),
            standards: IndexSet::new(),
            audits: IndexSet::new(),
            max_rows: None,
        }
    }

    /// Restrict risks to the given categories
    #[inline]
    #[must_use]
    pub fn with_risk_categories<S: Into<String>>(
        mut self,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        self.risk_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict business units to the given ids
    #[inline]
    #[must_use]
    pub fn with_units<S: Into<EntityId>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.units = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict standards to the given ids
    #[inline]
    #[must_use]
    pub fn with_standards<S: Into<EntityId>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.standards = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict audits to the given ids
    #[inline]
    #[must_use]
    pub fn with_audits<S: Into<EntityId>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.audits = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Cap every collection at `rows` entries
    #[inline]
    #[must_use]
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    fn is_active(&self, collection: Collection) -> bool {
        self.active.contains(&collection)
    }
}

/// Filters echoed into export metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilters {
    pub active_entity_types: Vec<String>,
    pub selected_audits: Vec<String>,
    pub selected_units: Vec<String>,
    pub selected_standards: Vec<String>,
    pub selected_risk_types: Vec<String>,
}

/// Per-collection counts of an export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCounts {
    pub risks: usize,
    pub controls: usize,
    pub issues: usize,
    pub incidents: usize,
    pub entities: usize,
    pub standards: usize,
    pub audits: usize,
    pub relationships: usize,
}

/// Metadata block attached to an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_date: String,
    pub filters: ExportFilters,
    pub total_counts: TotalCounts,
}

fn capped<T: Clone>(items: Vector<T>, max_rows: Option<usize>) -> Vector<T> {
    match max_rows {
        Some(rows) if rows < items.len() => items.take(rows),
        _ => items,
    }
}

fn keep_ids<T: EntityView + Clone>(items: &Vector<T>, ids: &IndexSet<EntityId>) -> Vector<T> {
    if ids.is_empty() {
        items.clone()
    } else {
        items.iter().filter(|e| ids.contains(e.id())).cloned().collect()
    }
}

fn to_strings<T: ToString>(items: impl IntoIterator<Item = T>) -> Vec<String> {
    items.into_iter().map(|i| i.to_string()).collect()
}

/// Select the normalized subset of `graph` matching `filter`
///
/// Business units come from `businessUnits`, else `entities`, and always land
/// in `entities`. Relationships survive only when both endpoints do.
#[must_use]
pub fn select(graph: &GraphSnapshot, filter: &GraphFilter) -> GraphSnapshot {
    let rows = filter.max_rows;
    let mut out = GraphSnapshot::new();

    if filter.is_active(Collection::Risks) {
        out.risks = graph.risks.as_ref().map(|risks| {
            let kept = if filter.risk_categories.is_empty() {
                risks.clone()
            } else {
                risks
                    .iter()
                    .filter(|r| {
                        r.category
                            .as_ref()
                            .is_some_and(|c| filter.risk_categories.contains(c))
                    })
                    .cloned()
                    .collect()
            };
            capped(kept, rows)
        });
    }
    if filter.is_active(Collection::Controls) {
        out.controls = graph.controls.clone().map(|c| capped(c, rows));
    }
    if filter.is_active(Collection::Issues) {
        out.issues = graph.issues.clone().map(|c| capped(c, rows));
    }
    if filter.is_active(Collection::Incidents) {
        out.incidents = graph.incidents.clone().map(|c| capped(c, rows));
    }
    if filter.is_active(Collection::Entities) || filter.is_active(Collection::BusinessUnits) {
        out.entities = graph
            .business_units_or_entities()
            .map(|units| capped(keep_ids(units, &filter.units), rows));
    }
    if filter.is_active(Collection::Standards) {
        out.standards = graph
            .standards
            .as_ref()
            .map(|s| capped(keep_ids(s, &filter.standards), rows));
    }
    if filter.is_active(Collection::Audits) {
        out.audits = graph
            .audits
            .as_ref()
            .map(|a| capped(keep_ids(a, &filter.audits), rows));
    }

    let kept: HashSet<_> = out.all_ids().into_iter().collect();
    out.relationships = graph
        .relationships
        .iter()
        .filter(|r| kept.contains(&r.source) && kept.contains(&r.target))
        .cloned()
        .collect();
    out
}

/// Build the metadata block for a selected subset
#[must_use]
pub fn export_metadata(
    selected: &GraphSnapshot,
    filter: &GraphFilter,
    now: DateTime<Utc>,
) -> ExportMetadata {
    let count = |c: Collection| selected.collection_len(c).unwrap_or(0);
    ExportMetadata {
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        filters: ExportFilters {
            active_entity_types: to_strings(filter.active.iter()),
            selected_audits: to_strings(filter.audits.iter()),
            selected_units: to_strings(filter.units.iter()),
            selected_standards: to_strings(filter.standards.iter()),
            selected_risk_types: filter.risk_categories.iter().cloned().collect(),
        },
        total_counts: TotalCounts {
            risks: count(Collection::Risks),
            controls: count(Collection::Controls),
            issues: count(Collection::Issues),
            incidents: count(Collection::Incidents),
            entities: count(Collection::Entities),
            standards: count(Collection::Standards),
            audits: count(Collection::Audits),
            relationships: selected.relationships.len(),
        },
    }
}

/// Select, attach export metadata, then denormalize
///
/// # Errors
/// Returns [`crate::NormalizeError::Metadata`] if the metadata block cannot be
/// encoded as JSON
pub fn export_filtered(
    graph: &GraphSnapshot,
    filter: &GraphFilter,
    now: DateTime<Utc>,
) -> NormalizeResult<GraphSnapshot> {
    let mut selected = select(graph, filter);
    let metadata = export_metadata(&selected, filter, now);
    info!(
        entities = selected.entity_count(),
        relationships = metadata.total_counts.relationships,
        "exporting filtered graph"
    );
    selected.metadata = Some(serde_json::to_value(&metadata)?);
    Ok(to_denormalized(&selected))
}
