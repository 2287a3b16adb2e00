//! Caller-owned cache of compiled filters keyed by source text
//!
//! Nothing in the engine consults this cache implicitly; invalidation is up
//! to the owner.

use super::{compile_with_options, CompiledFilter, FilterError};
use crate::config::runtime::ParserPreferences;
use crate::log_debug;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct FilterCache {
    filters: RwLock<HashMap<String, Arc<CompiledFilter>>>,
    preferences: ParserPreferences,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: ParserPreferences) -> Self {
        Self {
            filters: RwLock::new(HashMap::new()),
            preferences,
        }
    }

    // A panic while holding the lock cannot leave the map half-updated
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<CompiledFilter>>> {
        self.filters.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<CompiledFilter>>> {
        self.filters.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, source: &str) -> Option<Arc<CompiledFilter>> {
        self.read().get(source).cloned()
    }

    /// Return the cached filter for `source`, compiling it on a miss.
    /// Failed compilations are not cached.
    pub fn get_or_compile(&self, source: &str) -> Result<Arc<CompiledFilter>, FilterError> {
        if let Some(filter) = self.get(source) {
            log_debug!("Filter cache hit", "length" => source.len());
            return Ok(filter);
        }

        let compiled = Arc::new(compile_with_options(source, &self.preferences)?);
        let mut filters = self.write();
        // Another thread may have compiled the same source meanwhile
        let entry = filters
            .entry(source.to_string())
            .or_insert_with(|| compiled.clone());
        Ok(entry.clone())
    }

    /// Drop the entry for `source`; returns whether one existed
    pub fn invalidate(&self, source: &str) -> bool {
        self.write().remove(source).is_some()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::TagContext;
    use assert_matches::assert_matches;

    #[test]
    fn test_get_or_compile_reuses_entries() {
        let cache = FilterCache::new();
        let first = cache.get_or_compile("tag.a.b").unwrap();
        let second = cache.get_or_compile("tag.a.b").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = FilterCache::new();
        assert_matches!(cache.get_or_compile("tag.a and"), Err(FilterError::Parse(_)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = FilterCache::new();
        cache.get_or_compile("tag.a").unwrap();
        cache.get_or_compile("tag.b").unwrap();

        assert!(cache.invalidate("tag.a"));
        assert!(!cache.invalidate("tag.a"));
        assert!(cache.get("tag.a").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_preferences_apply_to_compilation() {
        let cache = FilterCache::with_preferences(ParserPreferences {
            max_nesting_depth: 1,
        });
        assert!(cache.get_or_compile("(tag.a)").is_ok());
        assert!(cache.get_or_compile("((tag.a))").is_err());
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = FilterCache::new();
        let ctx = TagContext::from_iter([("env", "prod")]);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let filter = cache.get_or_compile("tag.env.prod").unwrap();
                    assert_eq!(filter.evaluate(&ctx), Ok(true));
                });
            }
        });
        assert_eq!(cache.len(), 1);
    }
}
