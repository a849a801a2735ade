//! Coarse playback snapshots
//!
//! A [`TimelineSnapshot`] is one playback step: a date, labels, and per-category
//! lists of partial changes keyed by entity id. It is deliberately coarser
//! than the event log and carries no full records.

use crate::entity::{AuditPatch, ControlPatch, EntityId, IssuePatch, RiskPatch};
use crate::instant::parse_instant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Risk rating change in a playback step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskChange {
    pub id: EntityId,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::serialize_opt_f64"
    )]
    pub residual_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RiskChange {
    /// Typed patch carrying only the fields playback applies
    #[must_use]
    pub fn to_patch(&self) -> RiskPatch {
        RiskPatch {
            residual_rating: self.residual_rating,
            trend: self.trend.clone(),
            ..RiskPatch::default()
        }
    }
}

/// Control status change in a playback step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlChange {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::number::serialize_opt_f64"
    )]
    pub effectiveness_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_result: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ControlChange {
    /// Typed patch carrying only the fields playback applies
    #[must_use]
    pub fn to_patch(&self) -> ControlPatch {
        ControlPatch {
            status: self.status.clone(),
            effectiveness_score: self.effectiveness_score,
            test_result: self.test_result.clone(),
            ..ControlPatch::default()
        }
    }
}

/// Issue lifecycle change in a playback step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueChange {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl IssueChange {
    /// Status-only patch for an issue already present
    #[must_use]
    pub fn to_patch(&self) -> IssuePatch {
        IssuePatch {
            status: self.status.clone(),
            ..IssuePatch::default()
        }
    }

    /// Marks the issue open
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status.as_deref() == Some("open")
    }

    /// Marks the issue closed
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status.as_deref() == Some("closed")
    }
}

/// Incident occurrence in a playback step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentChange {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Audit progress change in a playback step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditChange {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_findings: Option<u32>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AuditChange {
    /// Typed patch carrying only the fields playback applies
    #[must_use]
    pub fn to_patch(&self) -> AuditPatch {
        AuditPatch {
            status: self.status.clone(),
            findings: self.findings,
            critical_findings: self.critical_findings,
            ..AuditPatch::default()
        }
    }
}

/// One playback step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    /// ISO date the step starts at
    #[serde(default)]
    pub date: String,
    /// Human-readable month, e.g. `Jan 2024`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(rename = "riskChanges", default, skip_serializing_if = "Vec::is_empty")]
    pub risk_changes: Vec<RiskChange>,
    #[serde(rename = "controlChanges", default, skip_serializing_if = "Vec::is_empty")]
    pub control_changes: Vec<ControlChange>,
    #[serde(rename = "issueChanges", default, skip_serializing_if = "Vec::is_empty")]
    pub issue_changes: Vec<IssueChange>,
    #[serde(rename = "incidentChanges", default, skip_serializing_if = "Vec::is_empty")]
    pub incident_changes: Vec<IncidentChange>,
    #[serde(rename = "auditChanges", default, skip_serializing_if = "Vec::is_empty")]
    pub audit_changes: Vec<AuditChange>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TimelineSnapshot {
    /// Create an empty step at a date
    #[must_use]
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    /// Parsed date
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.date)
    }

    /// Total number of changes across categories
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.risk_changes.len()
            + self.control_changes.len()
            + self.issue_changes.len()
            + self.incident_changes.len()
            + self.audit_changes.len()
    }
}

/// A dated highlight shown alongside playback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl KeyEvent {
    /// Create a titled key event
    #[must_use]
    pub fn new(date: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Parsed date
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.date)
    }
}

/// Playback payload: steps plus key events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackData {
    #[serde(default, deserialize_with = "crate::decode::vec")]
    pub snapshots: Vec<TimelineSnapshot>,
    #[serde(rename = "keyEvents", default, deserialize_with = "crate::decode::vec")]
    pub key_events: Vec<KeyEvent>,
}
