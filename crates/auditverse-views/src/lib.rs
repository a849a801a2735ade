//! AuditVerse Preset Views
//!
//! Named analysis filters over a normalized graph: uncovered risks, residual
//! hotspots, audit coverage gaps, failing controls and the like.
//!
//! # Example
//!
//! ```rust,ignore
//! use auditverse_views::{ViewContext, ViewRegistry};
//!
//! let registry = ViewRegistry::with_defaults();
//! let result = registry.apply("uncontrolled-risks", &graph, &ViewContext::default());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod preset;
pub mod registry;
pub mod view;

// Re-exports for convenience
pub use preset::builtin_views;
pub use registry::ViewRegistry;
pub use view::{
    PresetView, Priority, ViewCategory, ViewContext, ViewFilter, ViewInfo, ViewNode, ViewResult,
    DEFAULT_AUDIT_RECENCY_MONTHS, DEFAULT_HIGH_RESIDUAL_THRESHOLD,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use auditverse_test_utils::graph;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn view_result_serializes_for_the_viewer() {
        let data = graph(json!({
            "risks": [
                {"id": "R1", "name": "Fraud", "residual_rating": 4},
                {"id": "R2", "name": "Outage", "residual_rating": 9}
            ],
            "controls": [],
            "relationships": []
        }));

        let result = ViewRegistry::with_defaults()
            .apply("uncontrolled-risks", &data, &ViewContext::default())
            .unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "nodes": [
                    {"id": "R2", "name": "Outage", "residual_rating": 9},
                    {"id": "R1", "name": "Fraud", "residual_rating": 4}
                ],
                "links": [],
                "activeFilters": ["risks"],
                "message": "2 risk(s) without controls"
            })
        );
    }
}
