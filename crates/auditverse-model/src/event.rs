//! Timeline events and historical datasets

use crate::entity::EntityId;
use crate::instant::parse_instant;
use crate::playback::TimelineSnapshot;
use crate::relationship::Relationship;
use crate::snapshot::GraphSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Event type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    RiskRatingChange,
    ControlStatusChange,
    AuditStatusChange,
    IssueStatusChange,
    ControlAdded,
    IssueAdded,
    IncidentAdded,
    AuditAdded,
    RiskAdded,
    StandardAdded,
    BusinessUnitAdded,
    EntityRemoved,
    RelationshipAdded,
    RelationshipRemoved,
    /// Unrecognized type, kept verbatim
    Other(String),
}

impl EventKind {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::RiskRatingChange => "risk_rating_change",
            Self::ControlStatusChange => "control_status_change",
            Self::AuditStatusChange => "audit_status_change",
            Self::IssueStatusChange => "issue_status_change",
            Self::ControlAdded => "control_added",
            Self::IssueAdded => "issue_added",
            Self::IncidentAdded => "incident_added",
            Self::AuditAdded => "audit_added",
            Self::RiskAdded => "risk_added",
            Self::StandardAdded => "standard_added",
            Self::BusinessUnitAdded => "business_unit_added",
            Self::EntityRemoved => "entity_removed",
            Self::RelationshipAdded => "relationship_added",
            Self::RelationshipRemoved => "relationship_removed",
            Self::Other(s) => s,
        }
    }

    /// Shallow attribute merge onto an existing entity
    #[inline]
    #[must_use]
    pub fn is_attribute_change(&self) -> bool {
        matches!(
            self,
            Self::RiskRatingChange
                | Self::ControlStatusChange
                | Self::AuditStatusChange
                | Self::IssueStatusChange
        )
    }

    /// Appends a new entity
    #[inline]
    #[must_use]
    pub fn is_entity_add(&self) -> bool {
        matches!(
            self,
            Self::ControlAdded
                | Self::IssueAdded
                | Self::IncidentAdded
                | Self::AuditAdded
                | Self::RiskAdded
                | Self::StandardAdded
                | Self::BusinessUnitAdded
        )
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "risk_rating_change" => Self::RiskRatingChange,
            "control_status_change" => Self::ControlStatusChange,
            "audit_status_change" => Self::AuditStatusChange,
            "issue_status_change" => Self::IssueStatusChange,
            "control_added" => Self::ControlAdded,
            "issue_added" => Self::IssueAdded,
            "incident_added" => Self::IncidentAdded,
            "audit_added" => Self::AuditAdded,
            "risk_added" => Self::RiskAdded,
            "standard_added" => Self::StandardAdded,
            "business_unit_added" => Self::BusinessUnitAdded,
            "entity_removed" => Self::EntityRemoved,
            "relationship_added" => Self::RelationshipAdded,
            "relationship_removed" => Self::RelationshipRemoved,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dated mutation instruction
///
/// Every field is optional so that incomplete events still decode and can be
/// reported by validation instead of failing the whole timeline. An event
/// whose fields have the wrong JSON types decodes as a placeholder (see
/// [`Event::from_json`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// ISO date or timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Event type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventKind>,
    /// Subject entity id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Singular category name (`risk`, `control`, `businessUnit`, ...)
    #[serde(rename = "entityType", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// Partial attributes for change events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Map<String, Value>>,
    /// Full record for add events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Edge for relationship events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    /// Pass-through fields (descriptions, authors, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
    /// Decode error when this is a placeholder for a malformed event
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl Event {
    /// Create event of a kind at a date
    #[must_use]
    pub fn new(date: impl Into<String>, kind: impl Into<EventKind>) -> Self {
        Self {
            date: Some(date.into()),
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Decode one event, never failing
    ///
    /// A value that does not fit the event shape (a numeric `id` or `date`,
    /// non-object `changes`, ...) becomes a placeholder with every typed field
    /// empty, the raw attributes in `extra` and the reason in `malformed`.
    /// Placeholders have no date, so replay never applies them.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match Self::deserialize(&value) {
            Ok(event) => event,
            Err(err) => {
                let extra = match value {
                    Value::Object(map) => map.into_iter().collect(),
                    other => BTreeMap::from([("value".to_string(), other)]),
                };
                Self {
                    extra,
                    malformed: Some(err.to_string()),
                    ..Self::default()
                }
            }
        }
    }

    /// Placeholder for an event that did not decode
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.malformed.is_some()
    }

    /// With subject entity
    #[inline]
    #[must_use]
    pub fn with_entity(mut self, entity_type: impl Into<String>, id: impl Into<EntityId>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.id = Some(id.into());
        self
    }

    /// With attribute changes
    #[inline]
    #[must_use]
    pub fn with_changes(mut self, changes: Value) -> Self {
        if let Value::Object(map) = changes {
            self.changes = Some(map);
        }
        self
    }

    /// With full record payload
    #[inline]
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// With relationship payload
    #[inline]
    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationship = Some(relationship);
        self
    }

    /// Parsed date, `None` when missing or unparseable
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_instant)
    }
}

fn events<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Event>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().map(Event::from_json).collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            warn!("timeline events is not an array, ignored");
            Vec::new()
        }
    })
}

/// Ordered event log plus coarse snapshots
///
/// Events keep their positions even when malformed, so validation can
/// report them by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default, deserialize_with = "events")]
    pub events: Vec<Event>,
    #[serde(default, deserialize_with = "crate::decode::vec")]
    pub snapshots: Vec<TimelineSnapshot>,
}

/// Base state plus its history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataset {
    /// State as of now
    pub current: GraphSnapshot,
    /// Events and snapshots leading up to `current`
    #[serde(default)]
    pub timeline: Timeline,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl HistoricalDataset {
    /// Create dataset from a base state and timeline
    #[inline]
    #[must_use]
    pub fn new(current: GraphSnapshot, timeline: Timeline) -> Self {
        Self {
            current,
            timeline,
            metadata: None,
        }
    }
}
