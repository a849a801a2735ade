//! Timeline validation
//!
//! Two passes: a structural check over raw JSON before anything is decoded,
//! and a content check over decoded events. Both report problems as data;
//! neither fails the caller.

use crate::error::{TemporalError, TemporalResult};
use auditverse_model::{Event, HistoricalDataset, Timeline};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Outcome of the structural check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShapeReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Outcome of the per-event content check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(rename = "eventCount")]
    pub event_count: usize,
}

fn shape_failure(message: &str) -> ShapeReport {
    ShapeReport {
        valid: false,
        errors: vec![message.to_string()],
    }
}

/// Check the top-level layout of a dataset payload
///
/// The first three checks stop at the first failure; the two array checks
/// are both reported.
#[must_use]
pub fn validate_shape(data: &Value) -> ShapeReport {
    let Some(root) = data.as_object() else {
        return shape_failure("Data must be an object");
    };
    if !root.get("current").is_some_and(Value::is_object) {
        return shape_failure("Data must have a \"current\" object containing current state");
    }
    let Some(timeline) = root.get("timeline").and_then(Value::as_object) else {
        return shape_failure("Data must have a \"timeline\" object");
    };

    let mut errors = Vec::new();
    if !timeline.get("events").is_some_and(Value::is_array) {
        errors.push("Timeline must have an \"events\" array".to_string());
    }
    if !timeline.get("snapshots").is_some_and(Value::is_array) {
        errors.push("Timeline must have a \"snapshots\" array".to_string());
    }

    ShapeReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn has_date(event: &Event) -> bool {
    event.date.as_deref().is_some_and(|d| !d.is_empty())
}

fn has_kind(event: &Event) -> bool {
    event.kind.as_ref().is_some_and(|k| !k.as_str().is_empty())
}

/// Check every event for required fields and the log for date order
#[must_use]
pub fn validate_timeline_content(timeline: &Timeline) -> ContentReport {
    let events = &timeline.events;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (i, event) in events.iter().enumerate() {
        if let Some(reason) = &event.malformed {
            errors.push(format!("Event {i}: Malformed event ({reason})"));
            continue;
        }
        if !has_date(event) {
            errors.push(format!("Event {i}: Missing date"));
        }
        if !has_kind(event) {
            errors.push(format!("Event {i}: Missing type"));
        }
        if event.id.is_none() && event.relationship.is_none() {
            errors.push(format!("Event {i}: Missing id or relationship"));
        }
    }

    let out_of_order = events.windows(2).position(|pair| {
        matches!(
            (pair[0].instant(), pair[1].instant()),
            (Some(prev), Some(next)) if next < prev
        )
    });
    if let Some(i) = out_of_order {
        warnings.push(format!("Events not in chronological order at index {}", i + 1));
    }

    ContentReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        event_count: events.len(),
    }
}

/// A decoded dataset plus its content report
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: HistoricalDataset,
    pub report: ContentReport,
}

/// Validate, decode and content-check a dataset payload
///
/// Content problems are returned in the report, not as errors; replay is
/// best-effort over whatever decoded. Records and events decode one at a
/// time, so a mistyped field never rejects the whole payload.
///
/// # Errors
/// - [`TemporalError::InvalidShape`] if the structural check fails
/// - [`TemporalError::Decode`] if the payload does not decode
pub fn load_dataset(data: Value) -> TemporalResult<LoadedDataset> {
    let shape = validate_shape(&data);
    if !shape.valid {
        return Err(TemporalError::InvalidShape(shape.errors));
    }

    let dataset: HistoricalDataset = serde_json::from_value(data)?;
    let report = validate_timeline_content(&dataset.timeline);
    for warning in &report.warnings {
        warn!(%warning, "timeline warning");
    }
    info!(
        entities = dataset.current.entity_count(),
        events = report.event_count,
        snapshots = dataset.timeline.snapshots.len(),
        errors = report.errors.len(),
        "dataset loaded"
    );

    Ok(LoadedDataset { dataset, report })
}
