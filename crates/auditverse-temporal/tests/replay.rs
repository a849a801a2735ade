//! End-to-end replay properties

use auditverse_model::{
    Collection, EntityId, Event, EventKind, GraphSnapshot, HistoricalDataset, Risk, Timeline,
};
use auditverse_temporal::ReplayEngine;
use auditverse_test_utils::{added, change, graph, linked, removed, scenario_dataset, utc};
use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

fn day(offset: u32) -> String {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (start + Days::new(u64::from(offset)))
        .format("%Y-%m-%d")
        .to_string()
}

fn engine(current: GraphSnapshot, events: Vec<Event>) -> ReplayEngine {
    ReplayEngine::new(HistoricalDataset::new(
        current,
        Timeline {
            events,
            snapshots: Vec::new(),
        },
    ))
}

fn risk_ids(snapshot: &GraphSnapshot) -> BTreeSet<EntityId> {
    snapshot.ids(Collection::Risks).into_iter().collect()
}

#[test]
fn fine_grained_scenario() {
    let engine = ReplayEngine::new(scenario_dataset());

    let february = engine.reconstruct_at(Some(utc(2024, 2, 1)));
    assert_eq!(
        serde_json::to_value(&*february).unwrap(),
        json!({"risks": [{"id": "R1", "residual_rating": 8}]})
    );
    assert!(february.controls.as_ref().map_or(true, im::Vector::is_empty));

    let april = engine.reconstruct_at(Some(utc(2024, 4, 1)));
    assert_eq!(
        serde_json::to_value(&*april).unwrap(),
        json!({
            "risks": [{"id": "R1", "residual_rating": 8}],
            "controls": [{"id": "C1", "name": "Firewall"}]
        })
    );
}

#[test]
fn later_date_wins_whatever_the_log_order() {
    let current = graph(json!({"risks": [{"id": "R1", "residual_rating": 5}]}));
    let events = vec![
        change("2024-05-01", EventKind::RiskRatingChange, "risk", "R1", json!({"residual_rating": 3})),
        change("2024-02-01", EventKind::RiskRatingChange, "risk", "R1", json!({"residual_rating": 9})),
    ];
    let engine = engine(current, events);

    let march = engine.reconstruct_at(Some(utc(2024, 3, 1)));
    let june = engine.reconstruct_at(Some(utc(2024, 6, 1)));

    assert_eq!(march.risks.as_ref().unwrap()[0].residual_rating, Some(9.0));
    assert_eq!(june.risks.as_ref().unwrap()[0].residual_rating, Some(3.0));
}

#[test]
fn removal_leaves_no_dangling_relationships() {
    let current = graph(json!({
        "risks": [{"id": "R1"}, {"id": "R2"}],
        "controls": [{"id": "C1"}],
        "relationships": [{"source": "R1", "target": "C1", "type": "mitigated_by"}]
    }));
    let events = vec![
        linked("2024-01-01", EventKind::RelationshipAdded, "R2", "R1", "causes"),
        linked("2024-01-02", EventKind::RelationshipAdded, "R2", "C1", "mitigated_by"),
        removed("2024-02-01", "risk", "R1"),
    ];
    let engine = engine(current, events);

    let state = engine.reconstruct_at(Some(utc(2024, 3, 1)));

    let r1 = EntityId::from("R1");
    assert!(state.relationships.iter().all(|r| !r.touches(&r1)));
    assert_eq!(state.relationships.len(), 1);
    assert_eq!(risk_ids(&state), BTreeSet::from([EntityId::from("R2")]));
}

#[test]
fn cached_snapshots_are_independent() {
    let engine = ReplayEngine::new(scenario_dataset());

    let current = engine.reconstruct_at(None);
    let april = engine.reconstruct_at(Some(utc(2024, 4, 1)));

    assert_eq!(current.risks.as_ref().unwrap()[0].residual_rating, Some(5.0));
    assert_eq!(april.risks.as_ref().unwrap()[0].residual_rating, Some(8.0));
    assert!(current.controls.is_none());
}

#[derive(Debug, Clone)]
enum Op {
    Rate(f64),
    Add(u8),
    Remove(u8),
    Link(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..=25).prop_map(|r| Op::Rate(f64::from(r))),
        (0u8..6).prop_map(Op::Add),
        (0u8..6).prop_map(Op::Remove),
        (0u8..6).prop_map(Op::Link),
    ]
}

fn to_event(date: String, op: &Op) -> Event {
    match op {
        Op::Rate(r) => change(&date, EventKind::RiskRatingChange, "risk", "R0", json!({"residual_rating": r})),
        Op::Add(k) => added(&date, EventKind::RiskAdded, "risk", json!({"id": format!("R{k}")})),
        Op::Remove(k) => removed(&date, "risk", &format!("R{k}")),
        Op::Link(k) => linked(&date, EventKind::RelationshipAdded, "R0", &format!("R{k}"), "causes"),
    }
}

/// Events on distinct dates, plus a shuffled copy
fn distinct_dated_events() -> impl Strategy<Value = (Vec<Event>, Vec<Event>)> {
    proptest::collection::btree_map(0u32..200, op(), 0..24)
        .prop_map(|ops| {
            ops.iter()
                .map(|(offset, op)| to_event(day(*offset), op))
                .collect::<Vec<_>>()
        })
        .prop_flat_map(|events| (Just(events.clone()), Just(events).prop_shuffle()))
}

fn base() -> GraphSnapshot {
    let mut base = GraphSnapshot::new();
    base.risks = Some(vec![Risk::new("R0"), Risk::new("R1")].into());
    base
}

proptest! {
    #[test]
    fn input_order_does_not_matter(
        (events, shuffled) in distinct_dated_events(),
        offset in 0u32..220,
    ) {
        let at = Some(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                .and_hms_opt(0, 0, 0).unwrap()
                .and_utc() + Days::new(u64::from(offset)),
        );

        let ordered = engine(base(), events).reconstruct_at(at);
        let shuffled = engine(base(), shuffled).reconstruct_at(at);

        prop_assert_eq!(&*ordered, &*shuffled);
    }

    #[test]
    fn entity_sets_change_only_through_events(
        add_days in proptest::collection::vec(proptest::option::of(0u32..60), 4),
        remove_days in proptest::collection::vec(proptest::option::of(0u32..60), 2),
        (d1, d2) in (0u32..60, 0u32..60).prop_filter("d1 < d2", |(a, b)| a < b),
    ) {
        let mut events = Vec::new();
        for (k, when) in add_days.iter().enumerate() {
            if let Some(offset) = when {
                events.push(added(&day(*offset), EventKind::RiskAdded, "risk", json!({"id": format!("A{k}")})));
            }
        }
        for (k, when) in remove_days.iter().enumerate() {
            if let Some(offset) = when {
                events.push(removed(&day(*offset), "risk", &format!("R{k}")));
            }
        }

        let engine = engine(base(), events);
        let at = |offset: u32| {
            Some(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    .and_hms_opt(0, 0, 0).unwrap()
                    .and_utc() + Days::new(u64::from(offset)),
            )
        };
        let before = risk_ids(&engine.reconstruct_at(at(d1)));
        let after = risk_ids(&engine.reconstruct_at(at(d2)));

        let in_window = |when: &Option<u32>| when.is_some_and(|t| d1 < t && t <= d2);
        let gained: BTreeSet<EntityId> = add_days
            .iter()
            .enumerate()
            .filter(|(_, when)| in_window(when))
            .map(|(k, _)| EntityId::from(format!("A{k}")))
            .collect();
        let lost: BTreeSet<EntityId> = remove_days
            .iter()
            .enumerate()
            .filter(|(_, when)| in_window(when))
            .map(|(k, _)| EntityId::from(format!("R{k}")))
            .collect();
        let expected: BTreeSet<EntityId> = before
            .union(&gained)
            .filter(|id| !lost.contains(*id))
            .cloned()
            .collect();

        prop_assert_eq!(after, expected);
    }
}
