//! AuditVerse Temporal Engine
//!
//! Reconstructs the knowledge graph as it stood at any instant.
//!
//! # Core Operations
//!
//! - **Validate**: check a dataset payload's layout, then each event's
//!   required fields and the log's date order ([`validate_shape`],
//!   [`validate_timeline_content`])
//! - **Apply**: apply one event to a snapshot in place ([`apply_event`])
//! - **Reconstruct**: replay every event dated at or before an instant over a
//!   fresh copy of the current state, memoized per instant
//!   ([`ReplayEngine::reconstruct_at`])
//!
//! # Architecture
//!
//! ```text
//! JSON → validate_shape → HistoricalDataset → ReplayEngine ─┬→ Arc<GraphSnapshot>
//!                                     ↑                     │
//!                      validate_timeline_content     SnapshotCache (moka)
//! ```
//!
//! Malformed events never abort a reconstruction: each failure is an
//! [`ApplyError`], logged at warn level, and replay continues.
//!
//! # Example
//!
//! ```rust,ignore
//! use auditverse_temporal::{load_dataset, ReplayEngine};
//!
//! let loaded = load_dataset(json)?;
//! let engine = ReplayEngine::new(loaded.dataset);
//! let february = engine.reconstruct_at(Some(feb_1st));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod apply;
pub mod cache;
pub mod engine;
pub mod error;
pub mod validator;

// Re-exports for convenience
pub use apply::apply_event;
pub use auditverse_model::collection_name;
pub use cache::{CacheStats, SnapshotCache, CURRENT_KEY};
pub use engine::{ReplayEngine, ReplayStats};
pub use error::{ApplyError, TemporalError, TemporalResult};
pub use validator::{
    load_dataset, validate_shape, validate_timeline_content, ContentReport, LoadedDataset,
    ShapeReport,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for replaying timelines
    pub use crate::engine::{ReplayEngine, ReplayStats};
    pub use crate::error::{ApplyError, TemporalError};
    pub use crate::validator::{load_dataset, ContentReport, LoadedDataset};
    pub use auditverse_model::{Event, EventKind, GraphSnapshot, HistoricalDataset};
}
