//! YANG list key resolution
//!
//! Lists of objects are compared entry-by-entry after grouping on their key
//! leaves, so the comparator needs to know which leaves those are. Key facts
//! come from an external schema service and never change for a given path,
//! so answers are memoized in a [`KeyCache`] keyed by the selector-free path.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::Result;
use crate::path::strip_selectors;

/// External source of list key metadata
pub trait SchemaKeySource: Send + Sync {
    /// Key leaf names of the list at `list_path` on `device_id`
    ///
    /// `list_path` has its instance selectors stripped.
    fn list_keys(&self, device_id: &str, list_path: &str) -> Result<Vec<String>>;
}

/// Memo of list path → key leaf names
///
/// Clones share storage. Reads run concurrently; concurrent population of
/// the same path is last-write-wins, which is harmless because the values
/// are immutable schema facts.
#[derive(Debug, Clone, Default)]
pub struct KeyCache {
    entries: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl KeyCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache
    pub fn global() -> Self {
        static GLOBAL: OnceLock<KeyCache> = OnceLock::new();
        GLOBAL.get_or_init(KeyCache::new).clone()
    }

    /// Cached keys for a normalized path
    pub fn get(&self, path: &str) -> Option<Vec<String>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Store keys for a normalized path
    pub fn insert(&self, path: impl Into<String>, keys: Vec<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), keys);
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves and memoizes list keys
#[derive(Clone)]
pub struct ListKeyResolver {
    source: Arc<dyn SchemaKeySource>,
    cache: KeyCache,
}

impl std::fmt::Debug for ListKeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListKeyResolver")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl ListKeyResolver {
    /// Resolver backed by `source`, sharing the process-wide cache
    pub fn new(source: Arc<dyn SchemaKeySource>) -> Self {
        Self::with_cache(source, KeyCache::global())
    }

    /// Resolver backed by `source` with a caller-owned cache
    pub fn with_cache(source: Arc<dyn SchemaKeySource>, cache: KeyCache) -> Self {
        Self { source, cache }
    }

    /// The cache this resolver populates
    pub fn cache(&self) -> &KeyCache {
        &self.cache
    }

    /// Key leaf names of the list at `list_path`
    ///
    /// Lookup failures are logged and yield an empty key set, which makes
    /// the comparator fall back to whole-list equality. Failures are not
    /// cached.
    pub fn keys_of(&self, device_id: &str, list_path: &str) -> Vec<String> {
        let normalized = strip_selectors(list_path);
        if let Some(keys) = self.cache.get(&normalized) {
            return keys;
        }

        match self.source.list_keys(device_id, &normalized) {
            Ok(keys) => {
                tracing::debug!(device = %device_id, path = %normalized, ?keys, "Resolved list keys");
                self.cache.insert(normalized, keys.clone());
                keys
            }
            Err(e) => {
                tracing::warn!(device = %device_id, path = %normalized, "List key lookup failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Key source answering from a fixed table of normalized paths
///
/// Useful offline and in tests. Unknown paths resolve to an empty key set.
#[derive(Debug, Clone, Default)]
pub struct StaticKeySource {
    keys: HashMap<String, Vec<String>>,
}

impl StaticKeySource {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a table of path → keys
    pub fn from_map(keys: HashMap<String, Vec<String>>) -> Self {
        let keys = keys
            .into_iter()
            .map(|(path, keys)| (strip_selectors(&path), keys))
            .collect();
        Self { keys }
    }

    /// Register the keys of a list
    pub fn with_list<I, S>(mut self, list_path: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.insert(
            strip_selectors(list_path),
            keys.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl SchemaKeySource for StaticKeySource {
    fn list_keys(&self, _device_id: &str, list_path: &str) -> Result<Vec<String>> {
        Ok(self.keys.get(list_path).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl SchemaKeySource for CountingSource {
        fn list_keys(&self, _device_id: &str, list_path: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::KeyLookup {
                    path: list_path.to_string(),
                    message: "schema service unavailable".to_string(),
                });
            }
            Ok(vec!["name".to_string()])
        }
    }

    #[test]
    fn keys_are_memoized_per_normalized_path() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let resolver = ListKeyResolver::with_cache(source.clone(), KeyCache::new());

        let first = resolver.keys_of("ne-1", "conf:/port=1%2F1%2F1/sap");
        let second = resolver.keys_of("ne-2", "conf:/port=2%2F1%2F1/sap");

        assert_eq!(first, vec!["name".to_string()]);
        assert_eq!(second, first);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(resolver.cache().get("conf:/port/sap").is_some());
    }

    #[test]
    fn failed_lookups_yield_no_keys_and_are_retried() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let resolver = ListKeyResolver::with_cache(source.clone(), KeyCache::new());

        assert!(resolver.keys_of("ne-1", "conf:/port/sap").is_empty());
        assert!(resolver.keys_of("ne-1", "conf:/port/sap").is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn cache_clones_share_entries() {
        let cache = KeyCache::new();
        let clone = cache.clone();
        cache.insert("a/b", vec!["id".to_string()]);
        assert_eq!(clone.get("a/b"), Some(vec!["id".to_string()]));
    }

    #[test]
    fn static_source_normalizes_registered_paths() {
        let source = StaticKeySource::new().with_list("conf:/port=1/sap=x", ["sap-id"]);
        assert_eq!(
            source.list_keys("ne-1", "conf:/port/sap").unwrap(),
            vec!["sap-id".to_string()]
        );
        assert!(source.list_keys("ne-1", "conf:/other").unwrap().is_empty());
    }
}
