//! Facet cache keys and invalidation tags.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies one cached aggregation.
///
/// Entries are scoped per (main page, module): two modules listing the same
/// page never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FacetCacheKey {
    pub main_page_id: i64,
    pub module_id: String,
}

impl FacetCacheKey {
    pub fn new(main_page_id: i64, module_id: impl Into<String>) -> Self {
        Self {
            main_page_id,
            module_id: module_id.into(),
        }
    }

    /// Stable digest used in logs.
    pub fn fingerprint(&self) -> u64 {
        hash_value(self)
    }
}

impl fmt::Display for FacetCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "facets:{}:{}", self.main_page_id, self.module_id)
    }
}

/// Invalidation group, normally the content table an entry was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheTag(String);

impl CacheTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hash_value<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
