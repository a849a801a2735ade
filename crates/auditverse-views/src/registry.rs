//! Registry of preset views
//!
//! Provides [`ViewRegistry`] for listing, grouping and applying views by id.

use crate::preset::builtin_views;
use crate::view::{PresetView, ViewCategory, ViewContext, ViewInfo, ViewResult};
use auditverse_model::GraphSnapshot;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Views keyed by id, in registration order
#[derive(Debug, Default, Clone)]
pub struct ViewRegistry {
    views: IndexMap<&'static str, PresetView>,
}

impl ViewRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            views: IndexMap::new(),
        }
    }

    /// Create registry with the built-in views
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for view in builtin_views() {
            registry.register(view);
        }
        registry
    }

    /// Register a view, replacing any view with the same id
    pub fn register(&mut self, view: PresetView) {
        self.views.insert(view.id(), view);
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.views.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PresetView> {
        self.views.get(id)
    }

    /// Remove view
    #[inline]
    pub fn remove(&mut self, id: &str) -> bool {
        self.views.shift_remove(id).is_some()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Descriptors of every view
    #[must_use]
    pub fn list(&self) -> Vec<ViewInfo> {
        self.views.values().map(|v| v.info).collect()
    }

    /// Descriptors grouped by category, categories in first-seen order
    #[must_use]
    pub fn by_category(&self) -> IndexMap<ViewCategory, Vec<ViewInfo>> {
        let mut grouped: IndexMap<ViewCategory, Vec<ViewInfo>> = IndexMap::new();
        for view in self.views.values() {
            grouped.entry(view.info.category).or_default().push(view.info);
        }
        grouped
    }

    /// Apply view `id`; `None` for an unknown id
    #[must_use]
    pub fn apply(&self, id: &str, data: &GraphSnapshot, ctx: &ViewContext) -> Option<ViewResult> {
        let Some(view) = self.get(id) else {
            warn!(view = id, "preset view not found");
            return None;
        };
        let result = view.apply(data, ctx);
        debug!(view = id, nodes = result.nodes.len(), links = result.links.len(), "applied preset view");
        Some(result)
    }

    /// Iterate over registered views
    pub fn iter(&self) -> impl Iterator<Item = &PresetView> {
        self.views.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Priority;
    use auditverse_test_utils::graph;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn registry_new_empty() {
        let registry = ViewRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_with_defaults() {
        let registry = ViewRegistry::with_defaults();

        assert_eq!(registry.len(), 12);
        assert_eq!(
            registry.list().iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![
                "uncontrolled-risks",
                "unaudited-risks",
                "high-residual-risk",
                "enterprise-risk-profile",
                "high-issue-risks",
                "high-incident-risks",
                "audit-universe-coverage",
                "standard-violations",
                "unmonitored-standards",
                "audit-blind-spots",
                "regulatory-exposure",
                "failed-controls",
            ]
        );
    }

    #[test]
    fn registry_groups_by_category() {
        let grouped = ViewRegistry::with_defaults().by_category();

        assert_eq!(
            grouped.keys().copied().collect::<Vec<_>>(),
            vec![
                ViewCategory::Coverage,
                ViewCategory::Planning,
                ViewCategory::Executive,
                ViewCategory::Hotspot,
                ViewCategory::Compliance,
            ]
        );
        assert_eq!(grouped[&ViewCategory::Coverage].len(), 4);
        assert_eq!(grouped[&ViewCategory::Hotspot].len(), 3);
        assert_eq!(grouped[&ViewCategory::Compliance].len(), 2);
    }

    #[test]
    fn registry_remove() {
        let mut registry = ViewRegistry::with_defaults();
        assert!(registry.remove("failed-controls"));
        assert!(!registry.contains("failed-controls"));
        assert!(!registry.remove("failed-controls"));
    }

    #[test]
    fn registry_register_custom() {
        fn everything(data: &GraphSnapshot, _: &ViewContext) -> ViewResult {
            ViewResult {
                message: format!("{} entities", data.entity_count()),
                ..ViewResult::default()
            }
        }

        let mut registry = ViewRegistry::new();
        registry.register(PresetView::new(
            ViewInfo {
                id: "everything",
                name: "Everything",
                description: "Counts entities",
                priority: Priority::Medium,
                category: ViewCategory::Executive,
            },
            everything,
        ));

        let data = graph(json!({"risks": [{"id": "R1"}]}));
        let result = registry.apply("everything", &data, &ViewContext::default()).unwrap();
        assert_eq!(result.message, "1 entities");
    }

    #[test]
    fn unknown_view_is_none() {
        let registry = ViewRegistry::with_defaults();

        assert!(registry
            .apply("risk-heatmap", &GraphSnapshot::new(), &ViewContext::default())
            .is_none());
    }
}
