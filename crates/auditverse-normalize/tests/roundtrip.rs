//! Normalize/denormalize round trips over whole graphs

use auditverse_model::{Collection, Control, GraphSnapshot, Relationship, Risk};
use auditverse_normalize::{is_denormalized, to_denormalized, to_normalized};
use auditverse_test_utils::{graph, sample_graph};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

fn edge_set(graph: &GraphSnapshot) -> BTreeSet<(String, String, String)> {
    graph
        .relationships
        .iter()
        .map(|r| {
            (
                r.source.to_string(),
                r.target.to_string(),
                r.kind.as_ref().map(ToString::to_string).unwrap_or_default(),
            )
        })
        .collect()
}

#[test]
fn simple_graph_survives_round_trip() {
    let original = sample_graph();

    let embedded = to_denormalized(&original);
    assert!(is_denormalized(&embedded));
    assert!(embedded.relationships.is_empty());

    let back = to_normalized(&embedded);
    assert_eq!(edge_set(&back), edge_set(&original));
    assert!(!is_denormalized(&back));
    assert_eq!(back.entity_count(), original.entity_count());
}

#[test]
fn multiple_types_between_one_pair_collapse() {
    let original = graph(json!({
        "risks": [{"id": "R1", "name": "Fraud"}],
        "controls": [{"id": "C1", "name": "Firewall"}],
        "relationships": [
            {"source": "R1", "target": "C1", "type": "mitigated_by"},
            {"source": "C1", "target": "R1", "type": "verified_by"}
        ]
    }));

    let back = to_normalized(&to_denormalized(&original));

    assert_eq!(back.relationships.len(), 1);
    assert_eq!(back.relationships[0].source, "R1");
    assert!(back.relationships[0].is(&"controls".into()));
}

#[test]
fn name_collision_resolves_to_first_match() {
    let original = graph(json!({
        "risks": [{"id": "R1", "name": "Fraud"}],
        "controls": [{"id": "C1", "name": "Shared"}, {"id": "C2", "name": "Shared"}],
        "relationships": [{"source": "R1", "target": "C2", "type": "controls"}]
    }));

    let back = to_normalized(&to_denormalized(&original));

    assert_eq!(
        back.relationships.iter().cloned().collect::<Vec<_>>(),
        vec![
            Relationship::new("R1", "C1", "controls"),
            Relationship::new("C2", "R1", "risks"),
        ]
    );
}

proptest! {
    #[test]
    fn bipartite_graphs_round_trip(
        risk_count in 1usize..6,
        control_count in 1usize..6,
        edges in proptest::collection::btree_set((0usize..6, 0usize..6), 0..12),
    ) {
        let mut original = GraphSnapshot::new();
        original.risks = Some(
            (0..risk_count)
                .map(|i| Risk::new(format!("R{i}")).with_name(format!("risk {i}")))
                .collect(),
        );
        original.controls = Some(
            (0..control_count)
                .map(|i| Control::new(format!("C{i}")).with_name(format!("control {i}")))
                .collect(),
        );
        original.relationships = edges
            .into_iter()
            .filter(|(r, c)| *r < risk_count && *c < control_count)
            .map(|(r, c)| Relationship::new(format!("R{r}"), format!("C{c}"), "controls"))
            .collect();

        let back = to_normalized(&to_denormalized(&original));

        prop_assert_eq!(edge_set(&back), edge_set(&original));
        prop_assert_eq!(back.ids(Collection::Risks), original.ids(Collection::Risks));
    }
}
