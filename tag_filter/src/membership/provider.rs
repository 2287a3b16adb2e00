//! Tag context suppliers
//!
//! The engine never fetches tags itself. A provider hands over an
//! already-materialized context for one entity at one point in time.

use crate::evaluation::TagContext;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source of per-entity tag contexts
pub trait TagContextProvider: Send + Sync {
    /// Current tags of `entity`, or `None` when the entity is unknown
    fn tag_context(&self, entity: &str) -> Option<TagContext>;

    /// Entities this provider knows about, when it can enumerate them
    fn entities(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Provider backed by a map held in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryTagProvider {
    contexts: HashMap<String, TagContext>,
}

impl InMemoryTagProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tags of `entity`
    pub fn insert(&mut self, entity: impl Into<String>, tags: TagContext) -> Option<TagContext> {
        self.contexts.insert(entity.into(), tags)
    }

    pub fn remove(&mut self, entity: &str) -> Option<TagContext> {
        self.contexts.remove(entity)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Load from a JSON object mapping entity names to tag objects
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl TagContextProvider for InMemoryTagProvider {
    fn tag_context(&self, entity: &str) -> Option<TagContext> {
        self.contexts.get(entity).cloned()
    }

    /// Sorted entity names
    fn entities(&self) -> Vec<String> {
        let mut names: Vec<String> = self.contexts.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<S: Into<String>> FromIterator<(S, TagContext)> for InMemoryTagProvider {
    fn from_iter<I: IntoIterator<Item = (S, TagContext)>>(iter: I) -> Self {
        Self {
            contexts: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_enumeration() {
        let mut provider = InMemoryTagProvider::new();
        provider.insert("web-02", TagContext::from_iter([("env", "prod")]));
        provider.insert("web-01", TagContext::new());

        assert_eq!(provider.entities(), vec!["web-01", "web-02"]);
        assert_eq!(
            provider.tag_context("web-02").and_then(|c| c.get("env").map(str::to_string)),
            Some("prod".to_string())
        );
        assert!(provider.tag_context("db-01").is_none());

        provider.remove("web-01");
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_from_json() {
        let provider = InMemoryTagProvider::from_json_str(
            r#"{"alice": {"user_type": "contractor"}, "bob": {}}"#,
        )
        .unwrap();

        assert_eq!(provider.len(), 2);
        assert!(provider.tag_context("bob").is_some_and(|c| c.is_empty()));
    }
}
