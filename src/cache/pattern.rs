//! Key Pattern Module
//!
//! Parses deletion patterns. Only a single trailing `*` is a wildcard; a `*`
//! anywhere else is an ordinary character.

use crate::error::{CacheError, Result};

/// Wildcard marker that turns a pattern into a prefix match
pub const WILDCARD: char = '*';

// == Key Pattern ==
/// A parsed deletion pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPattern<'a> {
    /// Match one literal key
    Exact(&'a str),
    /// Match every key starting with the prefix
    Prefix(&'a str),
}

impl<'a> KeyPattern<'a> {
    /// Parses a raw pattern.
    ///
    /// Returns [`CacheError::KeyPatternNotSet`] for an empty pattern.
    pub fn parse(raw: &'a str) -> Result<Self> {
        if raw.is_empty() {
            return Err(CacheError::KeyPatternNotSet);
        }

        Ok(match raw.strip_suffix(WILDCARD) {
            Some(prefix) => KeyPattern::Prefix(prefix),
            None => KeyPattern::Exact(raw),
        })
    }

    /// Case-sensitive byte comparison against a registered key.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Exact(exact) => key == *exact,
            KeyPattern::Prefix(prefix) => key.starts_with(prefix),
        }
    }
}
