//! Reconstructed snapshot cache using moka
//!
//! Memoizes reconstructed snapshots per target instant. Entries are shared
//! as `Arc`s and never mutated after insertion.

use auditverse_model::GraphSnapshot;
use moka::sync::Cache;
use serde::Serialize;
use std::sync::Arc;

/// Key used for the untouched current state
pub const CURRENT_KEY: &str = "current";

/// Cache contents, for debugging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached snapshots
    pub size: usize,
    /// Cached keys, sorted
    pub keys: Vec<String>,
}

/// Unbounded per-session snapshot cache
///
/// There is no eviction: the key space is the set of distinct instants
/// queried in one session. Call [`SnapshotCache::clear`] when the dataset
/// changes.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    inner: Cache<String, Arc<GraphSnapshot>>,
}

impl SnapshotCache {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().build(),
        }
    }

    /// Get cached snapshot
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<GraphSnapshot>> {
        self.inner.get(key)
    }

    /// Get or compute snapshot
    ///
    /// Returns the snapshot and whether it was computed by this call.
    pub fn get_or_insert_with<F>(&self, key: String, f: F) -> (Arc<GraphSnapshot>, bool)
    where
        F: FnOnce() -> GraphSnapshot,
    {
        let mut computed = false;
        let snapshot = self.inner.get_with(key, || {
            computed = true;
            Arc::new(f())
        });
        (snapshot, computed)
    }

    /// Check if cache contains key
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        let mut keys: Vec<String> = self.inner.iter().map(|(k, _)| k.as_ref().clone()).collect();
        keys.sort();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once_per_key() {
        let cache = SnapshotCache::new();

        let (first, computed) = cache.get_or_insert_with(CURRENT_KEY.to_string(), GraphSnapshot::new);
        assert!(computed);

        let (second, computed) = cache.get_or_insert_with(CURRENT_KEY.to_string(), || {
            panic!("must not recompute")
        });
        assert!(!computed);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn clear_drops_entries() {
        let cache = SnapshotCache::new();
        cache.get_or_insert_with("2024-01-01T00:00:00.000Z".to_string(), GraphSnapshot::new);
        cache.get_or_insert_with(CURRENT_KEY.to_string(), GraphSnapshot::new);

        assert_eq!(
            cache.stats(),
            CacheStats {
                size: 2,
                keys: vec!["2024-01-01T00:00:00.000Z".to_string(), "current".to_string()],
            }
        );

        cache.clear();

        assert_eq!(cache.stats().size, 0);
        assert!(!cache.contains(CURRENT_KEY));
    }
}
