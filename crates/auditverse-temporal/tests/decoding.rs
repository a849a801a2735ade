//! Loading exports whose records and events mix value types

use auditverse_model::{Collection, EntityId, Measure};
use auditverse_temporal::{load_dataset, ReplayEngine};
use auditverse_test_utils::utc;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn numeric_control_effectiveness_loads() {
    let loaded = load_dataset(json!({
        "current": {
            "controls": [{
                "id": "C001",
                "name": "Example Control",
                "type": "Preventive",
                "effectiveness": 85,
                "status": "Active"
            }]
        },
        "timeline": {"events": [], "snapshots": []}
    }))
    .unwrap();

    let controls = loaded.dataset.current.controls.as_ref().unwrap();
    assert_eq!(controls[0].effectiveness.as_ref().and_then(Measure::as_f64), Some(85.0));
    assert_eq!(
        serde_json::to_value(&controls[0]).unwrap()["effectiveness"],
        json!(85)
    );
    assert!(loaded.report.valid);
}

#[test]
fn mistyped_event_is_reported_and_the_rest_replays() {
    let loaded = load_dataset(json!({
        "current": {"risks": [{"id": "R1", "residual_rating": 5}], "issues": []},
        "timeline": {
            "events": [
                {"date": "2024-01-01", "type": "risk_rating_change", "entityType": "risk",
                 "id": "R1", "changes": {"residual_rating": 8}},
                {"date": "2024-01-15", "type": "issue_added", "entityType": "issue",
                 "id": 42, "data": {"id": 42, "title": "Backlog"}}
            ],
            "snapshots": []
        }
    }))
    .unwrap();

    assert!(!loaded.report.valid);
    assert_eq!(loaded.report.event_count, 2);
    assert_eq!(loaded.report.errors.len(), 1);
    assert!(loaded.report.errors[0].starts_with("Event 1: Malformed event ("));

    let engine = ReplayEngine::new(loaded.dataset);
    let state = engine.reconstruct_at(Some(utc(2024, 2, 1)));
    assert_eq!(state.risks.as_ref().unwrap()[0].residual_rating, Some(8.0));
    assert_eq!(state.collection_len(Collection::Issues), Some(0));
    assert_eq!(engine.replay_stats().events_applied, 1);
}

#[test]
fn non_array_connections_are_skipped() {
    let loaded = load_dataset(json!({
        "current": {
            "risks": [{
                "id": "R1",
                "name": "Fraud",
                "connectedEntities": {"controls": ["Firewall"], "comment": "legacy"}
            }],
            "controls": [{"id": "C1", "name": "Firewall"}]
        },
        "timeline": {"events": [], "snapshots": []}
    }))
    .unwrap();

    let risks = loaded.dataset.current.risks.as_ref().unwrap();
    let connections = risks[0].connected_entities.as_ref().unwrap();
    assert_eq!(connections.keys().collect::<Vec<_>>(), vec!["controls"]);
}

#[test]
fn record_with_unusable_id_is_dropped_alone() {
    let loaded = load_dataset(json!({
        "current": {
            "risks": [
                {"id": 7, "name": "Numbered"},
                {"id": "R2", "name": "Outage", "owner": {"team": "ops"}}
            ],
            "relationships": [
                {"source": "R2", "target": "C1"},
                {"target": "C1", "type": "causes"}
            ]
        },
        "timeline": {"events": [], "snapshots": []}
    }))
    .unwrap();

    let current = &loaded.dataset.current;
    assert_eq!(current.ids(Collection::Risks), vec![EntityId::from("R2")]);
    let risk = &current.risks.as_ref().unwrap()[0];
    assert_eq!(risk.owner, None);
    assert_eq!(risk.extra.get("owner"), Some(&json!({"team": "ops"})));
    assert_eq!(current.relationships.len(), 1);
    assert_eq!(current.relationships[0].kind, None);
}
