//! Point-in-time reconstruction
//!
//! A [`ReplayEngine`] owns a historical dataset and rebuilds the graph as of
//! any instant by replaying the events dated at or before it over a fresh
//! copy of the current state.

use crate::apply::apply_event;
use crate::cache::{CacheStats, SnapshotCache, CURRENT_KEY};
use crate::validator::{validate_timeline_content, ContentReport};
use auditverse_model::{iso_key, Event, GraphSnapshot, HistoricalDataset, TimelineSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Replay counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    /// Events handed to [`apply_event`] across all reconstructions
    pub events_applied: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Default)]
struct Counters {
    events_applied: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

/// Event-sourced reconstruction over one dataset
///
/// The dataset is never mutated. Every cache miss starts from a structural
/// clone of `current`, so no event is ever applied twice to the same state.
#[derive(Debug)]
pub struct ReplayEngine {
    dataset: Arc<HistoricalDataset>,
    cache: SnapshotCache,
    counters: Counters,
}

impl ReplayEngine {
    /// Create engine over a dataset
    #[must_use]
    pub fn new(dataset: impl Into<Arc<HistoricalDataset>>) -> Self {
        Self {
            dataset: dataset.into(),
            cache: SnapshotCache::new(),
            counters: Counters::default(),
        }
    }

    /// The dataset being replayed
    #[inline]
    #[must_use]
    pub fn dataset(&self) -> &HistoricalDataset {
        &self.dataset
    }

    /// Swap in a new dataset and drop every cached snapshot
    pub fn replace_dataset(&mut self, dataset: impl Into<Arc<HistoricalDataset>>) {
        self.dataset = dataset.into();
        self.clear_cache();
        info!("dataset replaced");
    }

    /// State as of `at`, or the current state when `at` is `None`
    ///
    /// Results are memoized per instant (millisecond precision); a repeated
    /// call returns the same shared snapshot without replaying anything.
    pub fn reconstruct_at(&self, at: Option<DateTime<Utc>>) -> Arc<GraphSnapshot> {
        let key = at.as_ref().map_or_else(|| CURRENT_KEY.to_string(), iso_key);
        let (snapshot, computed) = self
            .cache
            .get_or_insert_with(key.clone(), || self.replay(at));

        if computed {
            self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "snapshot cache hit");
        }
        snapshot
    }

    fn replay(&self, at: Option<DateTime<Utc>>) -> GraphSnapshot {
        let mut state = self.dataset.current.clone();
        let Some(target) = at else {
            return state;
        };

        let mut relevant: Vec<(DateTime<Utc>, &Event)> = self
            .dataset
            .timeline
            .events
            .iter()
            .filter_map(|e| e.instant().map(|t| (t, e)))
            .filter(|(t, _)| *t <= target)
            .collect();
        // stable: equal dates keep log order
        relevant.sort_by_key(|(t, _)| *t);

        let mut skipped = 0usize;
        for (index, (_, event)) in relevant.iter().enumerate() {
            self.counters.events_applied.fetch_add(1, Ordering::Relaxed);
            if let Err(err) = apply_event(&mut state, event) {
                warn!(index, date = ?event.date, error = %err, "event skipped");
                skipped += 1;
            }
        }

        debug!(
            target = %iso_key(&target),
            applied = relevant.len() - skipped,
            skipped,
            "reconstructed snapshot"
        );
        state
    }

    /// Coarse playback steps of the timeline
    #[inline]
    #[must_use]
    pub fn snapshot_dates(&self) -> &[TimelineSnapshot] {
        &self.dataset.timeline.snapshots
    }

    /// Every event in log order
    #[inline]
    #[must_use]
    pub fn all_events(&self) -> &[Event] {
        &self.dataset.timeline.events
    }

    /// Events dated within `[start, end]`, in log order
    ///
    /// Events with missing or unparseable dates are never in range.
    #[must_use]
    pub fn events_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Event> {
        self.all_events()
            .iter()
            .filter(|e| e.instant().is_some_and(|t| start <= t && t <= end))
            .collect()
    }

    /// Drop every cached snapshot
    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("snapshot cache cleared");
    }

    /// Cached keys and their count
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Replay counters since construction
    #[must_use]
    pub fn replay_stats(&self) -> ReplayStats {
        ReplayStats {
            events_applied: self.counters.events_applied.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.counters.cache_misses.load(Ordering::Relaxed),
        }
    }

    /// Content check of the owned timeline
    ///
    /// A timeline with neither events nor snapshots is valid but warned about.
    #[must_use]
    pub fn validate_timeline(&self) -> ContentReport {
        let timeline = &self.dataset.timeline;
        if timeline.events.is_empty() && timeline.snapshots.is_empty() {
            return ContentReport {
                valid: true,
                warnings: vec!["No timeline data present".to_string()],
                ..ContentReport::default()
            };
        }
        validate_timeline_content(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditverse_model::{Collection, EntityId, EventKind, Timeline};
    use auditverse_test_utils::{change, graph, scenario_dataset, utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn none_returns_current_under_sentinel_key() {
        let engine = ReplayEngine::new(scenario_dataset());

        let snapshot = engine.reconstruct_at(None);

        assert_eq!(*snapshot, engine.dataset().current);
        assert_eq!(engine.cache_stats().keys, vec!["current".to_string()]);
    }

    #[test]
    fn repeated_instant_hits_cache() {
        let engine = ReplayEngine::new(scenario_dataset());
        let at = Some(utc(2024, 4, 1));

        let first = engine.reconstruct_at(at);
        let applied = engine.replay_stats().events_applied;
        let second = engine.reconstruct_at(at);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.replay_stats().events_applied, applied);
        assert_eq!(
            engine.replay_stats(),
            ReplayStats {
                events_applied: 2,
                cache_hits: 1,
                cache_misses: 1,
            }
        );
    }

    #[test]
    fn misses_never_start_from_cached_state() {
        let engine = ReplayEngine::new(scenario_dataset());

        engine.reconstruct_at(Some(utc(2024, 2, 1)));
        let later = engine.reconstruct_at(Some(utc(2024, 4, 1)));

        // both events replayed from `current`, the rating event twice in total
        assert_eq!(engine.replay_stats().events_applied, 3);
        assert_eq!(later.risks.as_ref().unwrap()[0].residual_rating, Some(8.0));
        assert_eq!(engine.dataset().current.risks.as_ref().unwrap()[0].residual_rating, Some(5.0));
    }

    #[test]
    fn equal_dates_apply_in_log_order() {
        let current = graph(json!({"risks": [{"id": "R1", "residual_rating": 1}]}));
        let events = vec![
            change("2024-01-01", EventKind::RiskRatingChange, "risk", "R1", json!({"residual_rating": 2})),
            change("2024-01-01", EventKind::RiskRatingChange, "risk", "R1", json!({"residual_rating": 3})),
        ];
        let engine = ReplayEngine::new(HistoricalDataset::new(
            current,
            Timeline { events, snapshots: Vec::new() },
        ));

        let state = engine.reconstruct_at(Some(utc(2024, 1, 1)));

        assert_eq!(state.risks.as_ref().unwrap()[0].residual_rating, Some(3.0));
    }

    #[test]
    fn bad_events_are_skipped() {
        let mut dataset = scenario_dataset();
        dataset.timeline.events.insert(
            0,
            change("2023-06-01", EventKind::IssueStatusChange, "issue", "I1", json!({"status": "closed"})),
        );
        dataset.timeline.events.push(Event::new("not a date", EventKind::RiskAdded));
        let engine = ReplayEngine::new(dataset);

        let state = engine.reconstruct_at(Some(utc(2024, 4, 1)));

        assert_eq!(state.ids(Collection::Controls), vec![EntityId::from("C1")]);
        assert_eq!(engine.replay_stats().events_applied, 3);
    }

    #[test]
    fn range_is_inclusive() {
        let engine = ReplayEngine::new(scenario_dataset());

        assert_eq!(engine.events_in_range(utc(2024, 1, 1), utc(2024, 3, 1)).len(), 2);
        assert_eq!(engine.events_in_range(utc(2024, 1, 2), utc(2024, 3, 1)).len(), 1);
        assert!(engine.events_in_range(utc(2025, 1, 1), utc(2025, 2, 1)).is_empty());
    }

    #[test]
    fn replace_dataset_clears_cache() {
        let mut engine = ReplayEngine::new(scenario_dataset());
        engine.reconstruct_at(None);
        engine.reconstruct_at(Some(utc(2024, 2, 1)));
        assert_eq!(engine.cache_stats().size, 2);

        engine.replace_dataset(HistoricalDataset::default());

        assert_eq!(engine.cache_stats().size, 0);
        assert!(engine.all_events().is_empty());
        assert_eq!(engine.validate_timeline().warnings, vec!["No timeline data present"]);
    }
}
