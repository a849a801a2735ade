//! File-level tests for the subcommand functions

use auditverse_cli::commands::{self, read_json, write_json, PlayInput};
use auditverse_model::{Collection, GraphSnapshot};
use auditverse_test_utils::{playback_data, sample_graph, scenario_value, utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;

#[test]
fn replay_reads_dataset_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    fs::write(&path, scenario_value().to_string()).unwrap();

    let value = read_json(&path).unwrap();
    let state = commands::replay(value.clone(), Some(utc(2024, 2, 1))).unwrap();

    let risks = state.risks.as_ref().unwrap();
    assert_eq!(risks[0].residual_rating, Some(8.0));
    assert!(state.controls.is_none());

    let latest = commands::replay(value, None).unwrap();
    assert_eq!(latest.collection_len(Collection::Controls), Some(1));
}

#[test]
fn read_json_names_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();

    let err = read_json(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));
}

#[test]
fn export_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("export.json");
    let graph = serde_json::to_value(sample_graph()).unwrap();

    let exported = commands::export(&graph, None, 10_000, utc(2024, 6, 1)).unwrap();
    write_json(&exported, Some(&out)).unwrap();

    let written: GraphSnapshot = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert!(written.relationships.is_empty());
    assert_eq!(written.collection_len(Collection::Risks), Some(2));
    let metadata = written.metadata.unwrap();
    assert_eq!(metadata["exportDate"], json!("2024-06-01T00:00:00.000Z"));
}

#[test]
fn normalize_round_trips_denormalized_input() {
    let value = json!({
        "risks": [{"id": "R1", "name": "Fraud", "connectedEntities": {"controls": ["Firewall"]}}],
        "controls": [{"id": "C1", "name": "Firewall", "connectedEntities": {"risks": ["Fraud"]}}]
    });

    let graph = commands::load_graph(&value).unwrap();

    let relationships = graph.relationships;
    assert_eq!(relationships.len(), 1);
    assert_eq!(relationships[0].source, "R1");
    assert_eq!(relationships[0].target, "C1");
}

#[tokio::test(start_paused = true)]
async fn play_prints_every_step() {
    let input = PlayInput {
        data: playback_data(),
        base: Some(sample_graph()),
    };
    let mut out = Vec::new();

    commands::play(input, 500, &mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("[1/3] 2024-01-01 Jan 2024: 1 change(s) - Baseline"));
    assert!(lines[0].contains("key events: Fraud spike"));
    assert!(lines[1].contains("(entities: 9)"));
    assert!(lines[2].starts_with("[3/3]"));
}

#[tokio::test(start_paused = true)]
async fn play_with_no_steps_says_so() {
    let mut out = Vec::new();

    commands::play(PlayInput::default(), 500, &mut out).await.unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "no snapshots to play\n");
}
