//! View descriptors and results

use auditverse_model::{Collection, Entity, EntityRecord, GraphSnapshot, Relationship};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Default residual rating at or above which a risk counts as high
pub const DEFAULT_HIGH_RESIDUAL_THRESHOLD: f64 = 7.0;

/// Default age in months after which an audit no longer counts as recent
pub const DEFAULT_AUDIT_RECENCY_MONTHS: u32 = 12;

/// How urgently a view should be surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
}

/// Grouping shown in view pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewCategory {
    Coverage,
    Planning,
    Executive,
    Hotspot,
    Compliance,
}

impl ViewCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coverage => "coverage",
            Self::Planning => "planning",
            Self::Executive => "executive",
            Self::Hotspot => "hotspot",
            Self::Compliance => "compliance",
        }
    }
}

impl fmt::Display for ViewCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing entry for a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub priority: Priority,
    pub category: ViewCategory,
}

/// Tunables shared by every view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewContext {
    /// Residual rating at or above which a risk is "high"
    pub high_residual_threshold: f64,
    /// Audits performed within this many months of `as_of` are recent
    pub audit_recency_months: u32,
    /// Reference instant for recency checks; the wall clock when unset
    pub as_of: Option<DateTime<Utc>>,
}

impl Default for ViewContext {
    fn default() -> Self {
        Self {
            high_residual_threshold: DEFAULT_HIGH_RESIDUAL_THRESHOLD,
            audit_recency_months: DEFAULT_AUDIT_RECENCY_MONTHS,
            as_of: None,
        }
    }
}

impl ViewContext {
    #[inline]
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.high_residual_threshold = threshold;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_audit_recency(mut self, months: u32) -> Self {
        self.audit_recency_months = months;
        self
    }

    /// Evaluate recency against `instant` instead of the wall clock
    #[inline]
    #[must_use]
    pub fn with_as_of(mut self, instant: DateTime<Utc>) -> Self {
        self.as_of = Some(instant);
        self
    }

    /// The instant recency is measured from
    #[must_use]
    pub fn reference_instant(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}

/// An entity plus view-computed annotations
///
/// Serializes as the record with the annotations merged in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewNode {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(flatten)]
    pub annotations: BTreeMap<String, Value>,
}

impl ViewNode {
    #[must_use]
    pub fn new<T: EntityRecord>(record: &T) -> Self {
        Self {
            entity: record.clone().into_entity(),
            annotations: BTreeMap::new(),
        }
    }

    /// Attach an annotation
    #[inline]
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.to_string(), value.into());
        self
    }

    /// Annotation value, if set
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }
}

/// What a view selected
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResult {
    pub nodes: Vec<ViewNode>,
    pub links: Vec<Relationship>,
    /// Collections the viewer should switch on
    pub active_filters: IndexSet<Collection>,
    pub message: String,
    /// Summary figures, for views that compute them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<IndexMap<String, Value>>,
}

impl ViewResult {
    /// Ids of the selected nodes, in order
    #[must_use]
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.entity.id().as_str()).collect()
    }
}

/// Signature of a view's filter
pub type ViewFilter = fn(&GraphSnapshot, &ViewContext) -> ViewResult;

/// A named, pure filter over a normalized graph
#[derive(Clone, Copy)]
pub struct PresetView {
    pub info: ViewInfo,
    filter: ViewFilter,
}

impl fmt::Debug for PresetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresetView").field("info", &self.info).finish_non_exhaustive()
    }
}

impl PresetView {
    /// Create view from a descriptor and a filter function
    #[must_use]
    pub const fn new(info: ViewInfo, filter: ViewFilter) -> Self {
        Self { info, filter }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.info.id
    }

    /// Run the filter
    #[must_use]
    pub fn apply(&self, data: &GraphSnapshot, ctx: &ViewContext) -> ViewResult {
        (self.filter)(data, ctx)
    }
}
