//! AuditVerse Snapshot Player
//!
//! Steps through coarse playback snapshots, either by hand or on a timer,
//! and applies a step's changes onto a base graph for display.
//!
//! # Core Operations
//!
//! - **Navigate**: bounded cursor moves that report whether they moved
//!   ([`SnapshotPlayer::next`], [`SnapshotPlayer::jump_to`], ...)
//! - **Play**: timed advance on a Tokio task until the last step
//!   ([`SnapshotPlayer::play`], [`SnapshotPlayer::pause`])
//! - **Apply**: overlay one step's changes onto a copy of a graph
//!   ([`apply_snapshot_to_data`], [`apply_snapshot_with_catalog`])
//!
//! # Example
//!
//! ```rust,ignore
//! use auditverse_player::SnapshotPlayer;
//!
//! let player = SnapshotPlayer::new(data).with_on_change(|snapshot, index, events| {
//!     println!("{index}: {} ({} key events)", snapshot.date, events.len());
//! });
//! player.set_speed(500);
//! player.play()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod apply;
pub mod error;
pub mod player;

// Re-exports for convenience
pub use apply::{apply_snapshot_to_data, apply_snapshot_with_catalog};
pub use error::{PlayerError, PlayerResult};
pub use player::{ChangeCallback, SnapshotPlayer, SnapshotStats, DEFAULT_SPEED_MS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving playback
    pub use crate::apply::apply_snapshot_to_data;
    pub use crate::error::PlayerError;
    pub use crate::player::SnapshotPlayer;
    pub use auditverse_model::{KeyEvent, PlaybackData, TimelineSnapshot};
}
