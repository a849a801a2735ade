//! Testing utilities for the AuditVerse workspace
//!
//! Shared fixtures: small graphs, historical datasets and playback steps.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use auditverse_model::{
    Event, EventKind, GraphSnapshot, HistoricalDataset, KeyEvent, PlaybackData, Relationship,
    Timeline, TimelineSnapshot,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

/// Midnight UTC on a calendar date
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Decode a graph from JSON, panicking on malformed fixtures
pub fn graph(value: Value) -> GraphSnapshot {
    serde_json::from_value(value).unwrap()
}

/// Attribute-change event on an entity
pub fn change(date: &str, kind: EventKind, entity_type: &str, id: &str, changes: Value) -> Event {
    Event::new(date, kind)
        .with_entity(entity_type, id)
        .with_changes(changes)
}

/// Add event carrying the full record
pub fn added(date: &str, kind: EventKind, entity_type: &str, data: Value) -> Event {
    let id = data["id"].as_str().unwrap_or_default().to_string();
    Event::new(date, kind)
        .with_entity(entity_type, id)
        .with_data(data)
}

/// Removal event
pub fn removed(date: &str, entity_type: &str, id: &str) -> Event {
    Event::new(date, EventKind::EntityRemoved).with_entity(entity_type, id)
}

/// Relationship add/remove event
pub fn linked(date: &str, kind: EventKind, source: &str, target: &str, rel: &str) -> Event {
    Event::new(date, kind).with_relationship(Relationship::new(source, target, rel))
}

/// A small normalized graph with one entity per category
///
/// Names are globally unique and every connected pair has one relationship.
pub fn sample_graph() -> GraphSnapshot {
    graph(json!({
        "risks": [
            {"id": "R1", "name": "Payment fraud", "category": "Financial",
             "inherent_rating": 20, "residual_rating": 12},
            {"id": "R2", "name": "Data center outage", "category": "Operational",
             "inherent_rating": 15, "residual_rating": 6}
        ],
        "controls": [
            {"id": "C1", "name": "Transaction monitoring", "status": "effective",
             "test_result": "passed"},
            {"id": "C2", "name": "Failover testing", "status": "needs_improvement",
             "test_result": "partial"}
        ],
        "issues": [
            {"id": "I1", "title": "Alert backlog", "status": "open", "severity": "high"}
        ],
        "incidents": [
            {"id": "INC1", "name": "Card skimming", "severity": "critical"}
        ],
        "businessUnits": [
            {"id": "BU1", "name": "Retail banking"}
        ],
        "standards": [
            {"id": "S1", "name": "PCI DSS"}
        ],
        "audits": [
            {"id": "A1", "title": "Payments audit", "status": "completed",
             "findings": 3, "critical_findings": 1}
        ],
        "relationships": [
            {"source": "R1", "target": "C1", "type": "controls"},
            {"source": "R2", "target": "C2", "type": "controls"},
            {"source": "R1", "target": "I1", "type": "issues"},
            {"source": "R1", "target": "INC1", "type": "incidents"},
            {"source": "R1", "target": "BU1", "type": "businessUnits"},
            {"source": "C1", "target": "S1", "type": "standards"},
            {"source": "R1", "target": "A1", "type": "audits"}
        ]
    }))
}

/// Base state `R1 (residual 5)` with a rating change and a control add
pub fn scenario_dataset() -> HistoricalDataset {
    let current = graph(json!({
        "risks": [{"id": "R1", "residual_rating": 5}]
    }));
    let events = vec![
        change(
            "2024-01-01",
            EventKind::RiskRatingChange,
            "risk",
            "R1",
            json!({"residual_rating": 8}),
        ),
        added(
            "2024-03-01",
            EventKind::ControlAdded,
            "control",
            json!({"id": "C1", "name": "Firewall"}),
        ),
    ];
    HistoricalDataset::new(
        current,
        Timeline {
            events,
            snapshots: Vec::new(),
        },
    )
}

/// Scenario dataset as raw JSON
pub fn scenario_value() -> Value {
    json!({
        "current": {"risks": [{"id": "R1", "residual_rating": 5}]},
        "timeline": {
            "events": [
                {"date": "2024-01-01", "type": "risk_rating_change", "entityType": "risk",
                 "id": "R1", "changes": {"residual_rating": 8}},
                {"date": "2024-03-01", "type": "control_added", "entityType": "control",
                 "id": "C1", "data": {"id": "C1", "name": "Firewall"}}
            ],
            "snapshots": []
        }
    })
}

/// `count` monthly playback steps starting January 2024
pub fn monthly_snapshots(count: u32) -> Vec<TimelineSnapshot> {
    (0..count)
        .map(|i| {
            let mut snapshot = TimelineSnapshot::new(format!("2024-{:02}-01", i + 1));
            snapshot.month = Some(format!("Month {}", i + 1));
            snapshot
        })
        .collect()
}

/// Playback payload with three steps and dated key events
pub fn playback_data() -> PlaybackData {
    serde_json::from_value(json!({
        "snapshots": [
            {"date": "2024-01-01", "month": "Jan 2024", "summary": "Baseline",
             "riskChanges": [{"id": "R1", "residual_rating": 14, "trend": "increasing"}]},
            {"date": "2024-02-01", "month": "Feb 2024",
             "controlChanges": [{"id": "C2", "status": "ineffective", "test_result": "failed"}],
             "issueChanges": [{"id": "I9", "status": "open", "severity": "critical"}]},
            {"date": "2024-03-01", "month": "Mar 2024",
             "incidentChanges": [{"id": "INC1", "severity": "high"}],
             "auditChanges": [{"id": "A1", "status": "in_progress", "findings": 5}]}
        ],
        "keyEvents": [
            {"date": "2024-01-15", "title": "Fraud spike"},
            {"date": "2024-02-01", "title": "Failover test failed"},
            {"date": "2024-03-20", "title": "Skimming incident"},
            {"date": "2024-04-02", "title": "After the window"}
        ]
    }))
    .unwrap()
}

/// A key event at a date
pub fn key_event(date: &str, title: &str) -> KeyEvent {
    KeyEvent::new(date, title)
}
