//! Key Registry Module
//!
//! Ordered side list of every key written through the manager. The backing
//! store cannot enumerate its keys, so pattern deletion scans this list.

use crate::cache::KeyPattern;

// == Key Registry ==
/// Ordered list of registered keys.
///
/// Repeated registrations of the same key are kept as duplicates; removal
/// always drops every occurrence.
#[derive(Debug, Default, Clone)]
pub struct KeyRegistry {
    keys: Vec<String>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Appends a key without deduplication.
    pub fn register(&mut self, key: &str) {
        self.keys.push(key.to_string());
    }

    /// Removes every key matching `pattern` in one pass.
    ///
    /// Non-matching keys keep their relative order. The removed keys are
    /// returned in registration order, duplicates included.
    pub fn remove_matching(&mut self, pattern: &KeyPattern<'_>) -> Vec<String> {
        let (removed, kept): (Vec<String>, Vec<String>) = std::mem::take(&mut self.keys)
            .into_iter()
            .partition(|key| pattern.matches(key));
        self.keys = kept;
        removed
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Owned copy of the current keys.
    pub fn snapshot(&self) -> Vec<String> {
        self.keys.clone()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_of(keys: &[&str]) -> KeyRegistry {
        let mut registry = KeyRegistry::new();
        for key in keys {
            registry.register(key);
        }
        registry
    }

    #[test]
    fn test_register_keeps_duplicates_in_order() {
        let registry = registry_of(&["b", "a", "b"]);
        assert_eq!(registry.snapshot(), vec!["b", "a", "b"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_remove_matching_prefix_preserves_order() {
        let mut registry = registry_of(&["test1", "madam1", "test2", "madam2", "unique"]);

        let removed = registry.remove_matching(&KeyPattern::Prefix("test"));

        assert_eq!(removed, vec!["test1", "test2"]);
        assert_eq!(registry.snapshot(), vec!["madam1", "madam2", "unique"]);
    }

    #[test]
    fn test_remove_matching_exact_drops_all_duplicates() {
        let mut registry = registry_of(&["dup", "other", "dup", "dupe"]);

        let removed = registry.remove_matching(&KeyPattern::Exact("dup"));

        assert_eq!(removed.len(), 2);
        assert_eq!(registry.snapshot(), vec!["other", "dupe"]);
    }

    #[test]
    fn test_remove_matching_without_match_is_noop() {
        let mut registry = registry_of(&["a", "b"]);

        let removed = registry.remove_matching(&KeyPattern::Prefix("nonexistent"));

        assert!(removed.is_empty());
        assert_eq!(registry.snapshot(), vec!["a", "b"]);
    }

    #[test]
    fn test_clear() {
        let mut registry = registry_of(&["a", "b"]);
        registry.clear();
        assert!(registry.is_empty());
    }
}
