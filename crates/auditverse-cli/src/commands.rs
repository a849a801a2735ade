//! Subcommand implementations
//!
//! Each command takes decoded JSON and returns a serializable result; `main`
//! owns argument parsing and output.

use anyhow::{bail, Context, Result};
use auditverse_model::{
    Collection, GraphSnapshot, HistoricalDataset, PlaybackData, TimelineSnapshot,
};
use auditverse_normalize::{ensure_normalized, export_filtered, is_denormalized, GraphFilter};
use auditverse_player::{apply_snapshot_to_data, SnapshotPlayer};
use auditverse_temporal::{load_dataset, validate_shape, ContentReport, ReplayEngine, ShapeReport};
use auditverse_views::{ViewContext, ViewRegistry, ViewResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// What kind of document a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputShape {
    /// `{current, timeline}`
    Dataset,
    /// `{snapshots, keyEvents}`
    Playback,
    /// Graph with a `relationships` list
    Normalized,
    /// Graph with embedded `connectedEntities`
    Denormalized,
}

/// Guess the shape of a document
#[must_use]
pub fn detect_shape(value: &Value) -> InputShape {
    let has = |key: &str| value.get(key).is_some();
    if has("current") && has("timeline") {
        InputShape::Dataset
    } else if value.get("snapshots").is_some_and(Value::is_array) && !has("relationships") {
        InputShape::Playback
    } else if serde_json::from_value::<GraphSnapshot>(value.clone())
        .is_ok_and(|graph| is_denormalized(&graph))
    {
        InputShape::Denormalized
    } else {
        InputShape::Normalized
    }
}

/// Read a JSON file
///
/// # Errors
/// Fails if the file cannot be read or is not JSON.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Pretty-print JSON to `out`, or stdout when `None`
///
/// # Errors
/// Fails if serialization or the write fails.
pub fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            std::fs::write(path, text + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Summary printed by `inspect`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport {
    pub shape: InputShape,
    /// Entity count per present collection
    pub collections: BTreeMap<String, usize>,
    pub relationships: usize,
    pub events: usize,
    pub snapshots: usize,
    pub key_events: usize,
}

fn collection_counts(graph: &GraphSnapshot) -> BTreeMap<String, usize> {
    Collection::ALL
        .into_iter()
        .filter_map(|c| graph.collection_len(c).map(|n| (c.as_str().to_string(), n)))
        .collect()
}

/// Describe a document
///
/// # Errors
/// Fails if the document does not decode as its detected shape.
pub fn inspect(value: &Value) -> Result<InspectReport> {
    let shape = detect_shape(value);
    let report = match shape {
        InputShape::Dataset => {
            let dataset: HistoricalDataset = serde_json::from_value(value.clone())?;
            InspectReport {
                shape,
                collections: collection_counts(&dataset.current),
                relationships: dataset.current.relationships.len(),
                events: dataset.timeline.events.len(),
                snapshots: dataset.timeline.snapshots.len(),
                key_events: 0,
            }
        }
        InputShape::Playback => {
            let data: PlaybackData = serde_json::from_value(value.clone())?;
            InspectReport {
                shape,
                collections: BTreeMap::new(),
                relationships: 0,
                events: 0,
                snapshots: data.snapshots.len(),
                key_events: data.key_events.len(),
            }
        }
        InputShape::Normalized | InputShape::Denormalized => {
            let graph: GraphSnapshot = serde_json::from_value(value.clone())?;
            InspectReport {
                shape,
                collections: collection_counts(&graph),
                relationships: graph.relationships.len(),
                events: 0,
                snapshots: 0,
                key_events: 0,
            }
        }
    };
    Ok(report)
}

/// Normalized graph from a graph document or a dataset's current state
///
/// # Errors
/// Fails on playback payloads and on documents that do not decode.
pub fn load_graph(value: &Value) -> Result<GraphSnapshot> {
    let graph = match detect_shape(value) {
        InputShape::Dataset => serde_json::from_value::<HistoricalDataset>(value.clone())?.current,
        InputShape::Playback => bail!("playback payloads carry no graph"),
        InputShape::Normalized | InputShape::Denormalized => serde_json::from_value(value.clone())?,
    };
    Ok(ensure_normalized(&graph))
}

/// Filtered denormalized export with metadata
///
/// # Errors
/// See [`load_graph`]; also fails if metadata cannot be encoded.
pub fn export(
    value: &Value,
    types: Option<&[Collection]>,
    max_rows: usize,
    now: DateTime<Utc>,
) -> Result<GraphSnapshot> {
    let graph = load_graph(value)?;
    let filter = types
        .map_or_else(GraphFilter::all, |t| GraphFilter::only(t.iter().copied()))
        .with_max_rows(max_rows);
    Ok(export_filtered(&graph, &filter, now)?)
}

/// Both validation passes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub shape: ShapeReport,
    /// Present only when the shape check passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentReport>,
}

impl ValidationSummary {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.shape.valid && self.content.as_ref().is_some_and(|c| c.valid)
    }
}

/// Validate a dataset document
///
/// # Errors
/// Fails only if a shape-valid document does not decode.
pub fn validate(value: &Value) -> Result<ValidationSummary> {
    let shape = validate_shape(value);
    if !shape.valid {
        return Ok(ValidationSummary { shape, content: None });
    }
    let dataset: HistoricalDataset = serde_json::from_value(value.clone())?;
    let content = ReplayEngine::new(dataset).validate_timeline();
    Ok(ValidationSummary {
        shape,
        content: Some(content),
    })
}

/// State of a dataset at `at`, or its current state
///
/// # Errors
/// Fails if the dataset does not load.
pub fn replay(value: Value, at: Option<DateTime<Utc>>) -> Result<Arc<GraphSnapshot>> {
    let loaded = load_dataset(value).context("loading dataset")?;
    let engine = ReplayEngine::new(loaded.dataset);
    let state = engine.reconstruct_at(at);
    let stats = engine.replay_stats();
    info!(events_applied = stats.events_applied, "replay finished");
    Ok(state)
}

/// Steps to play plus an optional graph to apply them to
#[derive(Debug, Clone, Default)]
pub struct PlayInput {
    pub data: PlaybackData,
    pub base: Option<GraphSnapshot>,
}

/// Playback steps from a playback payload or a dataset's snapshots
///
/// # Errors
/// Fails if the document does not decode.
pub fn play_input(value: &Value) -> Result<PlayInput> {
    match detect_shape(value) {
        InputShape::Dataset => {
            let dataset: HistoricalDataset = serde_json::from_value(value.clone())?;
            Ok(PlayInput {
                data: PlaybackData {
                    snapshots: dataset.timeline.snapshots,
                    key_events: Vec::new(),
                },
                base: Some(dataset.current),
            })
        }
        InputShape::Playback => Ok(PlayInput {
            data: serde_json::from_value(value.clone())?,
            base: None,
        }),
        InputShape::Normalized | InputShape::Denormalized => {
            bail!("expected a playback payload or a historical dataset")
        }
    }
}

fn step_line(step: &TimelineSnapshot, index: usize, count: usize, titles: &[String]) -> String {
    let mut line = format!(
        "[{}/{count}] {} {}: {} change(s)",
        index + 1,
        step.date,
        step.month.as_deref().unwrap_or(""),
        step.change_count()
    );
    if let Some(summary) = &step.summary {
        line.push_str(&format!(" - {summary}"));
    }
    if !titles.is_empty() {
        line.push_str(&format!(" | key events: {}", titles.join(", ")));
    }
    line
}

/// Play every step at `speed_ms`, writing one line per step to `out`
///
/// With a base graph, each step is applied cumulatively and the resulting
/// entity count is appended to the line.
///
/// # Errors
/// Fails if playback cannot start or a write fails.
pub async fn play<W: Write>(input: PlayInput, speed_ms: u64, out: &mut W) -> Result<()> {
    let count = input.data.snapshots.len();
    if count == 0 {
        writeln!(out, "no snapshots to play")?;
        return Ok(());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let player = SnapshotPlayer::new(input.data).with_on_change(move |step, index, events| {
        let titles: Vec<String> = events.iter().filter_map(|e| e.title.clone()).collect();
        // receiver gone means playback was abandoned
        let _ = tx.send((step.clone(), index, titles));
    });
    player.set_speed(speed_ms);
    player.play()?;

    let mut state = input.base;
    while let Some((step, index, titles)) = rx.recv().await {
        let mut line = step_line(&step, index, count, &titles);
        if let Some(graph) = state.as_mut() {
            *graph = apply_snapshot_to_data(graph, &step);
            line.push_str(&format!(" (entities: {})", graph.entity_count()));
        }
        writeln!(out, "{line}")?;
        debug!(index, "step printed");
        if index + 1 == count {
            break;
        }
    }
    player.pause();
    Ok(())
}

/// Apply a preset view to a graph document
///
/// # Errors
/// Fails for unknown view ids and undecodable documents.
pub fn apply_view(
    registry: &ViewRegistry,
    value: &Value,
    id: &str,
    ctx: &ViewContext,
) -> Result<ViewResult> {
    if !registry.contains(id) {
        let known: Vec<&str> = registry.iter().map(|v| v.id()).collect();
        bail!("unknown view '{id}' (known: {})", known.join(", "));
    }
    let graph = load_graph(value)?;
    registry
        .apply(id, &graph, ctx)
        .with_context(|| format!("view '{id}' produced no result"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditverse_test_utils::{playback_data, sample_graph, scenario_value};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn detects_shapes() {
        assert_eq!(detect_shape(&scenario_value()), InputShape::Dataset);
        assert_eq!(
            detect_shape(&serde_json::to_value(playback_data()).unwrap()),
            InputShape::Playback
        );
        assert_eq!(
            detect_shape(&serde_json::to_value(sample_graph()).unwrap()),
            InputShape::Normalized
        );
        assert_eq!(
            detect_shape(&json!({
                "risks": [{"id": "R1", "name": "Fraud", "connectedEntities": {"controls": ["Firewall"]}}],
                "controls": [{"id": "C1", "name": "Firewall"}]
            })),
            InputShape::Denormalized
        );
    }

    #[test]
    fn inspect_counts_dataset() {
        let report = inspect(&scenario_value()).unwrap();

        assert_eq!(report.shape, InputShape::Dataset);
        assert_eq!(report.collections.get("risks"), Some(&1));
        assert_eq!(report.events, 2);
    }

    #[test]
    fn validate_reports_shape_failures_as_data() {
        let summary = validate(&json!({"current": {}})).unwrap();

        assert!(!summary.is_valid());
        assert!(summary.content.is_none());
        assert_eq!(summary.shape.errors, vec!["Data must have a \"timeline\" object"]);
    }

    #[test]
    fn validate_warns_on_empty_timeline() {
        let summary = validate(&json!({"current": {}, "timeline": {"events": [], "snapshots": []}})).unwrap();

        assert!(summary.is_valid());
        assert_eq!(summary.content.unwrap().warnings, vec!["No timeline data present"]);
    }

    #[test]
    fn export_limits_types() {
        let value = serde_json::to_value(sample_graph()).unwrap();
        let now = auditverse_test_utils::utc(2024, 5, 1);

        let exported = export(&value, Some(&[Collection::Risks]), 10_000, now).unwrap();

        assert_eq!(exported.collection_len(Collection::Risks), Some(2));
        assert!(exported.controls.is_none());
        assert!(exported.metadata.is_some());
    }

    #[test]
    fn unknown_view_lists_known_ids() {
        let registry = ViewRegistry::with_defaults();
        let value = serde_json::to_value(sample_graph()).unwrap();

        let err = apply_view(&registry, &value, "nope", &ViewContext::default()).unwrap_err();

        assert!(err.to_string().contains("uncontrolled-risks"));
    }

    #[test]
    fn graph_documents_cannot_play() {
        let value = serde_json::to_value(sample_graph()).unwrap();
        assert!(play_input(&value).is_err());
    }
}
