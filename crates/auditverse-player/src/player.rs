//! Timer-driven snapshot playback
//!
//! A [`SnapshotPlayer`] walks a list of [`TimelineSnapshot`]s with a bounded
//! cursor. Every successful move emits the new step, its index and the key
//! events that fall inside the step, to an optional change callback.
//!
//! # States
//!
//! ```text
//! Stopped --play()--> Playing --pause()/end of list--> Stopped
//! ```
//!
//! While playing, a Tokio task advances the cursor once per `speed` interval.
//! Cursor state lives behind a `parking_lot` mutex; the callback is always
//! invoked after the lock is released.

use crate::error::{PlayerError, PlayerResult};
use auditverse_model::{start_of_next_month, KeyEvent, PlaybackData, TimelineSnapshot};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default interval between steps
pub const DEFAULT_SPEED_MS: u64 = 2000;

/// Change listener: `(snapshot, index, key_events)`
pub type ChangeCallback = Arc<dyn Fn(&TimelineSnapshot, usize, &[KeyEvent]) + Send + Sync>;

/// Summary of the step under the cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub date: String,
    pub month: Option<String>,
    pub summary: Option<String>,
    pub risk_changes: usize,
    pub control_changes: usize,
    pub issue_changes: usize,
    pub incident_changes: usize,
    pub audit_changes: usize,
    pub total_changes: usize,
}

impl From<&TimelineSnapshot> for SnapshotStats {
    fn from(snapshot: &TimelineSnapshot) -> Self {
        Self {
            date: snapshot.date.clone(),
            month: snapshot.month.clone(),
            summary: snapshot.summary.clone(),
            risk_changes: snapshot.risk_changes.len(),
            control_changes: snapshot.control_changes.len(),
            issue_changes: snapshot.issue_changes.len(),
            incident_changes: snapshot.incident_changes.len(),
            audit_changes: snapshot.audit_changes.len(),
            total_changes: snapshot.change_count(),
        }
    }
}

#[derive(Debug)]
struct Cursor {
    index: usize,
    playing: bool,
    speed: Duration,
    /// Bumped whenever a timer is started or stopped; stale ticks compare against it
    generation: u64,
    timer: Option<JoinHandle<()>>,
    runtime: Option<Handle>,
}

impl Cursor {
    fn stop_timer(&mut self) {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Shared {
    snapshots: Vec<TimelineSnapshot>,
    /// Key events per step, precomputed from the step windows
    windows: Vec<Vec<KeyEvent>>,
    cursor: Mutex<Cursor>,
    on_change: RwLock<Option<ChangeCallback>>,
}

impl Shared {
    fn last_index(&self) -> Option<usize> {
        self.snapshots.len().checked_sub(1)
    }

    fn emit(&self, index: usize) {
        let Some(snapshot) = self.snapshots.get(index) else {
            return;
        };
        debug!(index, date = %snapshot.date, "playback step");
        let callback = self.on_change.read().clone();
        if let Some(callback) = callback {
            callback(snapshot, index, &self.windows[index]);
        }
    }

    /// Move the cursor with `f`; emit if it moved
    fn move_cursor(&self, f: impl FnOnce(&mut Cursor, usize) -> Option<usize>) -> bool {
        let len = self.snapshots.len();
        let moved = {
            let mut cursor = self.cursor.lock();
            let target = f(&mut cursor, len);
            if let Some(index) = target {
                cursor.index = index;
            }
            target
        };
        match moved {
            Some(index) => {
                self.emit(index);
                true
            }
            None => false,
        }
    }

    /// One timer tick for `generation`; `false` ends the timer task
    fn tick(&self, generation: u64) -> bool {
        let advanced = {
            let mut cursor = self.cursor.lock();
            if cursor.generation != generation || !cursor.playing {
                return false;
            }
            if cursor.index + 1 < self.snapshots.len() {
                cursor.index += 1;
                Some(cursor.index)
            } else {
                cursor.playing = false;
                cursor.generation += 1;
                cursor.timer = None;
                None
            }
        };
        match advanced {
            Some(index) => {
                self.emit(index);
                true
            }
            None => {
                info!(steps = self.snapshots.len(), "playback complete");
                false
            }
        }
    }

    fn start_timer(self: &Arc<Self>, cursor: &mut Cursor) {
        cursor.stop_timer();
        let Some(runtime) = cursor.runtime.clone() else {
            return;
        };
        let generation = cursor.generation;
        let period = cursor.speed;
        cursor.timer = Some(runtime.spawn(run_timer(Arc::downgrade(self), generation, period)));
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.cursor.get_mut().stop_timer();
    }
}

async fn run_timer(shared: Weak<Shared>, generation: u64, period: Duration) {
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticks.tick().await;
        let Some(shared) = shared.upgrade() else {
            return;
        };
        if !shared.tick(generation) {
            return;
        }
    }
}

/// Key events in `[step.date, next.date)`, or up to the first of the following
/// month for the last step
fn key_event_windows(snapshots: &[TimelineSnapshot], key_events: &[KeyEvent]) -> Vec<Vec<KeyEvent>> {
    snapshots
        .iter()
        .enumerate()
        .map(|(index, snapshot)| {
            let Some(start) = snapshot.instant() else {
                return Vec::new();
            };
            let end = snapshots
                .get(index + 1)
                .and_then(TimelineSnapshot::instant)
                .unwrap_or_else(|| start_of_next_month(&start));
            key_events
                .iter()
                .filter(|e| e.instant().is_some_and(|t| start <= t && t < end))
                .cloned()
                .collect()
        })
        .collect()
}

/// Bounded cursor over playback steps with optional timed playback
///
/// Cloning shares the same cursor. The timer task holds only a weak
/// reference, so dropping the last clone stops playback.
#[derive(Clone)]
pub struct SnapshotPlayer {
    shared: Arc<Shared>,
}

impl fmt::Debug for SnapshotPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cursor = self.shared.cursor.lock();
        f.debug_struct("SnapshotPlayer")
            .field("snapshots", &self.shared.snapshots.len())
            .field("index", &cursor.index)
            .field("playing", &cursor.playing)
            .field("speed", &cursor.speed)
            .finish_non_exhaustive()
    }
}

impl SnapshotPlayer {
    /// Create stopped player at the first step
    #[must_use]
    pub fn new(data: PlaybackData) -> Self {
        let windows = key_event_windows(&data.snapshots, &data.key_events);
        Self {
            shared: Arc::new(Shared {
                snapshots: data.snapshots,
                windows,
                cursor: Mutex::new(Cursor {
                    index: 0,
                    playing: false,
                    speed: Duration::from_millis(DEFAULT_SPEED_MS),
                    generation: 0,
                    timer: None,
                    runtime: None,
                }),
                on_change: RwLock::new(None),
            }),
        }
    }

    /// Player with no steps
    #[must_use]
    pub fn empty() -> Self {
        Self::new(PlaybackData::default())
    }

    /// Player over optional data; `None` gives an empty player
    #[must_use]
    pub fn from_data(data: Option<PlaybackData>) -> Self {
        data.map_or_else(Self::empty, Self::new)
    }

    /// Set change listener
    #[must_use]
    pub fn with_on_change<F>(self, f: F) -> Self
    where
        F: Fn(&TimelineSnapshot, usize, &[KeyEvent]) + Send + Sync + 'static,
    {
        self.set_on_change(f);
        self
    }

    /// Replace change listener
    pub fn set_on_change<F>(&self, f: F)
    where
        F: Fn(&TimelineSnapshot, usize, &[KeyEvent]) + Send + Sync + 'static,
    {
        *self.shared.on_change.write() = Some(Arc::new(f));
    }

    /// Start timed playback
    ///
    /// No-op when already playing or when there are no steps. Restarts from
    /// the first step when the cursor is on the last one. Emits the current
    /// step immediately.
    ///
    /// # Errors
    /// Returns [`PlayerError::NoRuntime`] outside a Tokio runtime.
    pub fn play(&self) -> PlayerResult<()> {
        let runtime = Handle::try_current().map_err(|_| PlayerError::NoRuntime)?;
        let Some(last) = self.shared.last_index() else {
            return Ok(());
        };

        let index = {
            let mut cursor = self.shared.cursor.lock();
            if cursor.playing {
                return Ok(());
            }
            if cursor.index >= last {
                cursor.index = 0;
            }
            cursor.playing = true;
            cursor.runtime = Some(runtime);
            self.shared.start_timer(&mut cursor);
            cursor.index
        };

        info!(index, speed_ms = self.speed(), "playback started");
        self.shared.emit(index);
        Ok(())
    }

    /// Stop timed playback; idempotent
    pub fn pause(&self) {
        let mut cursor = self.shared.cursor.lock();
        if !cursor.playing {
            return;
        }
        cursor.playing = false;
        cursor.stop_timer();
        debug!(index = cursor.index, "playback paused");
    }

    /// Pause and return to the first step
    pub fn reset(&self) {
        self.pause();
        self.jump_to_first();
    }

    /// Advance one step
    pub fn next(&self) -> bool {
        self.shared
            .move_cursor(|cursor, len| (cursor.index + 1 < len).then(|| cursor.index + 1))
    }

    /// Go back one step
    pub fn previous(&self) -> bool {
        self.shared.move_cursor(|cursor, _| cursor.index.checked_sub(1))
    }

    /// Move to `index`; `false` when out of range
    pub fn jump_to(&self, index: usize) -> bool {
        self.shared.move_cursor(|_, len| (index < len).then_some(index))
    }

    pub fn jump_to_first(&self) -> bool {
        self.jump_to(0)
    }

    pub fn jump_to_latest(&self) -> bool {
        self.shared
            .last_index()
            .is_some_and(|last| self.jump_to(last))
    }

    /// Change the step interval, clamped to at least 1 ms
    ///
    /// A running timer is restarted with the new interval. The cursor is kept
    /// and nothing is emitted.
    pub fn set_speed(&self, ms: u64) {
        let mut cursor = self.shared.cursor.lock();
        cursor.speed = Duration::from_millis(ms.max(1));
        if cursor.playing {
            self.shared.start_timer(&mut cursor);
        }
        debug!(speed_ms = ms.max(1), "playback speed changed");
    }

    /// Step interval in milliseconds
    #[must_use]
    pub fn speed(&self) -> u64 {
        u64::try_from(self.shared.cursor.lock().speed.as_millis()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.shared.cursor.lock().playing
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.shared.cursor.lock().index
    }

    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.shared.snapshots.len()
    }

    #[must_use]
    pub fn snapshot(&self, index: usize) -> Option<&TimelineSnapshot> {
        self.shared.snapshots.get(index)
    }

    /// Step under the cursor; `None` when there are no steps
    #[must_use]
    pub fn current_snapshot(&self) -> Option<&TimelineSnapshot> {
        self.snapshot(self.current_index())
    }

    /// Key events that fall inside step `index`
    #[must_use]
    pub fn events_for_snapshot(&self, index: usize) -> &[KeyEvent] {
        self.shared.windows.get(index).map_or(&[], Vec::as_slice)
    }

    /// Cursor position as a percentage of the list
    ///
    /// `0.0` with no steps, `100.0` with exactly one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        match self.snapshot_count() {
            0 => 0.0,
            1 => 100.0,
            len => self.current_index() as f64 / (len - 1) as f64 * 100.0,
        }
    }

    /// Change counts of the step under the cursor
    #[must_use]
    pub fn current_stats(&self) -> Option<SnapshotStats> {
        self.current_snapshot().map(SnapshotStats::from)
    }
}

impl Default for SnapshotPlayer {
    fn default() -> Self {
        Self::empty()
    }
}
