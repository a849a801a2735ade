//! AuditVerse Model
//!
//! Shared data model for the audit/risk knowledge graph and its history.
//!
//! # Core Concepts
//!
//! - [`Category`]: the seven fixed entity kinds (risk, control, issue, ...)
//! - [`Collection`]: pluralized array names a snapshot stores entities under
//! - [`EntityRecord`]: typed per-category records with typed partial updates
//! - [`GraphSnapshot`]: entities plus relationships at one instant
//! - [`Event`] / [`Timeline`]: the dated mutation log replayed over a base
//! - [`TimelineSnapshot`]: coarse per-step change sets used for playback
//!
//! Snapshots store entities in [`im::Vector`]s so that cloning a snapshot is
//! cheap and clones stay independent of each other.
//!
//! # Example
//!
//! ```rust,ignore
//! use auditverse_model::{GraphSnapshot, Risk};
//!
//! let mut snapshot = GraphSnapshot::default();
//! snapshot.risks = Some(vec![Risk::new("R1").with_name("Fraud")].into());
//! assert_eq!(snapshot.entity_count(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod category;
mod decode;
mod entity;
mod event;
mod instant;
mod number;
mod playback;
mod relationship;
mod snapshot;

// Re-exports
pub use category::{collection_name, Category, CategoryParseError, Collection};
pub use entity::{
    Audit, AuditPatch, BusinessUnit, BusinessUnitPatch, ConnectedEntities, Control, ControlPatch,
    Entity, EntityId, EntityRecord, EntityView, Incident, IncidentPatch, Issue, IssuePatch, Risk,
    RiskPatch, Standard, StandardPatch,
};
pub use event::{Event, EventKind, HistoricalDataset, Timeline};
pub use instant::{iso_key, parse_instant, start_of_next_month};
pub use number::{number_value, Measure};
pub use playback::{
    AuditChange, ControlChange, IncidentChange, IssueChange, KeyEvent, PlaybackData, RiskChange,
    TimelineSnapshot,
};
pub use relationship::{RelationType, Relationship};
pub use snapshot::{CollectionVisitor, CollectionVisitorMut, GraphSnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
