//! The pattern cache (spec §4.F): memoizes parse output keyed by the exact
//! pattern string, for the lifetime of the owning facade. Opt-in at facade
//! construction, safe for concurrent access.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::MessageFormatError;
use crate::pattern::{self, Pattern};

#[derive(Default)]
pub(crate) struct PatternCache {
    entries: RwLock<HashMap<String, Arc<Pattern>>>,
}

impl PatternCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the cached tree for `source`, parsing and inserting it on a
    /// miss. A race between two threads parsing the same new pattern is
    /// harmless: parsing is pure, so the loser's result is simply discarded
    /// in favor of whichever writer's `entry(...).or_insert_with` ran first
    /// (spec §4.F, §5).
    pub(crate) fn get_or_parse(&self, source: &str) -> Result<Arc<Pattern>, MessageFormatError> {
        if let Some(existing) = self
            .entries
            .read()
            .expect("pattern cache lock poisoned")
            .get(source)
        {
            log::trace!("pattern cache hit for {source:?}");
            return Ok(Arc::clone(existing));
        }

        log::trace!("pattern cache miss for {source:?}, parsing");
        let parsed = Arc::new(pattern::parse(source)?);
        let mut guard = self.entries.write().expect("pattern cache lock poisoned");
        let entry = guard
            .entry(source.to_owned())
            .or_insert_with(|| Arc::clone(&parsed));
        Ok(Arc::clone(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_lookups_return_the_same_tree() {
        let cache = PatternCache::new();
        let a = cache.get_or_parse("Hello, {name}!").unwrap();
        let b = cache.get_or_parse("Hello, {name}!").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn a_bad_pattern_is_not_cached_as_a_success() {
        let cache = PatternCache::new();
        assert!(cache.get_or_parse("{unterminated").is_err());
        assert!(cache.get_or_parse("{unterminated").is_err());
    }
}
