//! AuditVerse Normalizer
//!
//! Converts knowledge-graph data between its two on-disk shapes:
//!
//! - **Normalized**: flat entity collections plus a separate `relationships`
//!   list. This is what the viewer renders and the replay engine consumes.
//! - **Denormalized**: each entity carries `connectedEntities`, a map from a
//!   collection-ish key to the display labels of connected entities. This is
//!   the export shape.
//!
//! Conversion is pure and deliberately lossy in the same places every time:
//! connections resolve by display label, and a pair of entities is linked at
//! most once when normalizing, whatever the relationship types.
//!
//! # Example
//!
//! ```rust,ignore
//! use auditverse_normalize::{is_denormalized, to_normalized};
//!
//! let graph = if is_denormalized(&input) { to_normalized(&input) } else { input };
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod convert;
mod error;
mod filter;

pub use convert::{is_denormalized, to_denormalized, to_normalized, RELATED_SUFFIX, UNKNOWN_KEY};
pub use error::{NormalizeError, NormalizeResult};
pub use filter::{
    export_filtered, export_metadata, select, ExportFilters, ExportMetadata, GraphFilter,
    TotalCounts, EXPORTABLE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Normalize `graph` if it carries embedded connections, else return a copy
#[must_use]
pub fn ensure_normalized(graph: &auditverse_model::GraphSnapshot) -> auditverse_model::GraphSnapshot {
    if is_denormalized(graph) {
        tracing::info!("converting denormalized input");
        to_normalized(graph)
    } else {
        graph.clone()
    }
}
