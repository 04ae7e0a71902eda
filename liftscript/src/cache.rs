//! Parse cache
//!
//! Maps source text to its parse outcome. Parse errors are cached too,
//! since the same source always fails the same way. Oldest entries are
//! evicted once the limit is reached.

use crate::script::Script;
use liftscript_core::ScriptError;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub const DEFAULT_CACHE_LIMIT: usize = 256;

#[derive(Debug)]
pub struct ParseCache {
    entries: HashMap<String, Result<Arc<Script>, ScriptError>>,
    order: VecDeque<String>,
    limit: usize,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseCache {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_CACHE_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Parse `source`, or return the cached outcome
    pub fn get_or_parse(&mut self, source: &str) -> Result<Arc<Script>, ScriptError> {
        if let Some(hit) = self.entries.get(source) {
            return hit.clone();
        }

        let parsed = Script::parse(source).map(Arc::new);
        while self.entries.len() >= self.limit {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.entries.insert(source.to_string(), parsed.clone());
        self.order.push_back(source.to_string());
        parsed
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_handle_returned() {
        let mut cache = ParseCache::new();
        let a = cache.get_or_parse("1 + 1").unwrap();
        let b = cache.get_or_parse("1 + 1").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_cached() {
        let mut cache = ParseCache::new();
        let first = cache.get_or_parse("1 +").unwrap_err();
        let second = cache.get_or_parse("1 +").unwrap_err();
        assert_eq!(first, second);
        assert!(cache.contains("1 +"));
    }

    #[test]
    fn test_oldest_evicted() {
        let mut cache = ParseCache::with_limit(2);
        cache.get_or_parse("1").unwrap();
        cache.get_or_parse("2").unwrap();
        cache.get_or_parse("3").unwrap();
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("1"));
        assert!(cache.contains("3"));
    }
}
