//! Applying a playback step's changes to a base graph

use auditverse_model::{EntityId, EntityRecord, GraphSnapshot, TimelineSnapshot};
use tracing::debug;

const CLOSED: &str = "closed";

fn find_mut<'a, T: EntityRecord>(
    items: &'a mut Option<im::Vector<T>>,
    id: &EntityId,
) -> Option<&'a mut T> {
    items.as_mut()?.iter_mut().find(|e| e.id() == id)
}

fn find<'a, T: EntityRecord>(items: &'a Option<im::Vector<T>>, id: &EntityId) -> Option<&'a T> {
    items.as_ref()?.iter().find(|e| e.id() == id)
}

/// Apply a step's changes onto a copy of `base`
///
/// Issues and incidents that first appear in this step are copied in from
/// `base` itself. See [`apply_snapshot_with_catalog`].
#[must_use]
pub fn apply_snapshot_to_data(base: &GraphSnapshot, snapshot: &TimelineSnapshot) -> GraphSnapshot {
    apply_snapshot_with_catalog(base, base, snapshot)
}

/// Apply a step's changes onto a copy of `base`, drawing new records from `catalog`
///
/// - risks: `residual_rating`, `trend`
/// - controls: `status`, `effectiveness_score`, `test_result`, only when the
///   change carries a `status`
/// - issues: existing issues take the new `status`; an `open` change for an
///   absent issue inserts the catalog record with the change's status and
///   severity (only if the copy has an issues collection); an issue whose
///   last change here is `closed` and which was already closed in `base` is
///   dropped
/// - incidents: insert-only from the catalog, with the change's severity
/// - audits: `status`, `findings`, `critical_findings`
///
/// Changes for ids not found are ignored.
#[must_use]
pub fn apply_snapshot_with_catalog(
    base: &GraphSnapshot,
    catalog: &GraphSnapshot,
    snapshot: &TimelineSnapshot,
) -> GraphSnapshot {
    let mut data = base.clone();

    for change in &snapshot.risk_changes {
        if let Some(risk) = find_mut(&mut data.risks, &change.id) {
            risk.merge(change.to_patch());
        }
    }

    for change in snapshot.control_changes.iter().filter(|c| c.status.is_some()) {
        if let Some(control) = find_mut(&mut data.controls, &change.id) {
            control.merge(change.to_patch());
        }
    }

    apply_issue_changes(&mut data, base, catalog, snapshot);

    if let Some(incidents) = data.incidents.as_mut() {
        for change in &snapshot.incident_changes {
            let Some(full) = find(&catalog.incidents, &change.id) else {
                continue;
            };
            if incidents.iter().any(|i| i.id == change.id) {
                continue;
            }
            let mut incident = full.clone();
            if change.severity.is_some() {
                incident.severity.clone_from(&change.severity);
            }
            incidents.push_back(incident);
        }
    }

    for change in &snapshot.audit_changes {
        if let Some(audit) = find_mut(&mut data.audits, &change.id) {
            audit.merge(change.to_patch());
        }
    }

    debug!(
        date = %snapshot.date,
        changes = snapshot.change_count(),
        "applied playback step"
    );
    data
}

fn apply_issue_changes(
    data: &mut GraphSnapshot,
    base: &GraphSnapshot,
    catalog: &GraphSnapshot,
    snapshot: &TimelineSnapshot,
) {
    if snapshot.issue_changes.is_empty() {
        return;
    }

    for change in &snapshot.issue_changes {
        if let Some(issue) = find_mut(&mut data.issues, &change.id) {
            if change.status.is_some() {
                issue.merge(change.to_patch());
            }
            continue;
        }
        if !change.is_open() {
            continue;
        }
        let (Some(full), Some(issues)) = (find(&catalog.issues, &change.id), data.issues.as_mut())
        else {
            continue;
        };
        let mut issue = full.clone();
        issue.status.clone_from(&change.status);
        if change.severity.is_some() {
            issue.severity.clone_from(&change.severity);
        }
        issues.push_back(issue);
    }

    let closed_in_base = |id: &EntityId| {
        find(&base.issues, id).is_some_and(|i| i.status.as_deref() == Some(CLOSED))
    };
    if let Some(issues) = data.issues.as_mut() {
        issues.retain(|issue| {
            let last = snapshot.issue_changes.iter().rev().find(|c| c.id == issue.id);
            !(last.is_some_and(|c| c.is_closed()) && closed_in_base(&issue.id))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditverse_model::Collection;
    use auditverse_test_utils::graph;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn step(value: serde_json::Value) -> TimelineSnapshot {
        serde_json::from_value(value).unwrap()
    }

    fn base() -> GraphSnapshot {
        graph(json!({
            "risks": [{"id": "R1", "name": "Fraud", "residual_rating": 10, "owner": "CRO"}],
            "controls": [{"id": "C1", "status": "effective", "effectiveness_score": 0.9}],
            "issues": [
                {"id": "I1", "title": "Backlog", "status": "open", "severity": "low"},
                {"id": "I2", "title": "Old finding", "status": "closed"}
            ],
            "incidents": [],
            "audits": [{"id": "A1", "status": "planned"}]
        }))
    }

    fn catalog() -> GraphSnapshot {
        graph(json!({
            "issues": [{"id": "I9", "title": "New gap", "status": "draft", "owner": "IT"}],
            "incidents": [{"id": "INC1", "name": "Outage", "severity": "low", "financial_impact": 5000}]
        }))
    }

    #[test]
    fn updates_typed_fields_and_leaves_base_untouched() {
        let base = base();
        let out = apply_snapshot_to_data(
            &base,
            &step(json!({
                "date": "2024-01-01",
                "riskChanges": [{"id": "R1", "residual_rating": 12, "trend": "increasing"}],
                "auditChanges": [{"id": "A1", "status": "fieldwork", "findings": 4}]
            })),
        );

        let risk = &out.risks.as_ref().unwrap()[0];
        assert_eq!(risk.residual_rating, Some(12.0));
        assert_eq!(risk.trend.as_deref(), Some("increasing"));
        assert_eq!(risk.owner.as_deref(), Some("CRO"));
        let audit = &out.audits.as_ref().unwrap()[0];
        assert_eq!(audit.status.as_deref(), Some("fieldwork"));
        assert_eq!(audit.findings, Some(4));
        assert_eq!(base.risks.as_ref().unwrap()[0].residual_rating, Some(10.0));
    }

    #[test]
    fn control_changes_need_status() {
        let out = apply_snapshot_to_data(
            &base(),
            &step(json!({
                "date": "2024-01-01",
                "controlChanges": [{"id": "C1", "effectiveness_score": 0.1}]
            })),
        );
        assert_eq!(out.controls.as_ref().unwrap()[0].effectiveness_score, Some(0.9));

        let out = apply_snapshot_to_data(
            &base(),
            &step(json!({
                "date": "2024-01-01",
                "controlChanges": [{"id": "C1", "status": "ineffective", "effectiveness_score": 0.1}]
            })),
        );
        let control = &out.controls.as_ref().unwrap()[0];
        assert_eq!(control.status.as_deref(), Some("ineffective"));
        assert_eq!(control.effectiveness_score, Some(0.1));
    }

    #[test]
    fn open_issue_is_inserted_from_catalog() {
        let out = apply_snapshot_with_catalog(
            &base(),
            &catalog(),
            &step(json!({
                "date": "2024-02-01",
                "issueChanges": [{"id": "I9", "status": "open", "severity": "critical"}]
            })),
        );

        let inserted = out.issues.as_ref().unwrap().last().cloned().unwrap();
        assert_eq!(inserted.id, "I9");
        assert_eq!(inserted.status.as_deref(), Some("open"));
        assert_eq!(inserted.severity.as_deref(), Some("critical"));
        assert_eq!(inserted.owner.as_deref(), Some("IT"));
    }

    #[test]
    fn open_issue_needs_catalog_record_and_collection() {
        let step = step(json!({
            "date": "2024-02-01",
            "issueChanges": [{"id": "I9", "status": "open"}]
        }));

        let out = apply_snapshot_to_data(&base(), &step);
        assert_eq!(out.collection_len(Collection::Issues), Some(2));

        let mut no_issues = base();
        no_issues.issues = None;
        let out = apply_snapshot_with_catalog(&no_issues, &catalog(), &step);
        assert!(out.issues.is_none());
    }

    #[test]
    fn closed_issue_dropped_only_if_closed_in_base() {
        let out = apply_snapshot_to_data(
            &base(),
            &step(json!({
                "date": "2024-03-01",
                "issueChanges": [
                    {"id": "I1", "status": "closed"},
                    {"id": "I2", "status": "closed"}
                ]
            })),
        );

        let issues = out.issues.as_ref().unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, "I1");
        assert_eq!(issues[0].status.as_deref(), Some("closed"));
    }

    #[test]
    fn later_reopen_keeps_issue() {
        let out = apply_snapshot_to_data(
            &base(),
            &step(json!({
                "date": "2024-03-01",
                "issueChanges": [
                    {"id": "I2", "status": "closed"},
                    {"id": "I2", "status": "open"}
                ]
            })),
        );

        assert_eq!(out.collection_len(Collection::Issues), Some(2));
    }

    #[test]
    fn incidents_are_insert_only() {
        let step = step(json!({
            "date": "2024-03-01",
            "incidentChanges": [
                {"id": "INC1", "severity": "high"},
                {"id": "INC1", "severity": "critical"},
                {"id": "GHOST"}
            ]
        }));

        let out = apply_snapshot_with_catalog(&base(), &catalog(), &step);

        let incidents = out.incidents.as_ref().unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].severity.as_deref(), Some("high"));
        assert_eq!(incidents[0].financial_impact, Some(5000.0));
    }
}
