//! Tagged key-value storage for facet aggregations.

use std::sync::RwLock;

use lru::LruCache;
use metrics::counter;
use thiserror::Error;

use crate::domain::facets::AggregationResult;

use super::config::CacheConfig;
use super::keys::{CacheTag, FacetCacheKey};
use super::lock::{rw_read, rw_write};
use super::registry::TagRegistry;

const SOURCE: &str = "cache::store";
pub(crate) const METRIC_EVICT_TOTAL: &str = "content_filter_facet_cache_evict_total";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend failed during `{op}`: {message}")]
    Backend { op: &'static str, message: String },
}

impl CacheError {
    pub fn backend(op: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            op,
            message: message.into(),
        }
    }
}

/// Key-value cache whose entries carry an invalidation tag.
///
/// Implementations never decide when to invalidate; callers purge a tag when
/// the data behind it changes.
pub trait TaggedCache: Send + Sync {
    fn get(&self, key: &FacetCacheKey) -> Result<Option<AggregationResult>, CacheError>;

    fn put(
        &self,
        key: FacetCacheKey,
        tag: CacheTag,
        value: AggregationResult,
    ) -> Result<(), CacheError>;

    /// Drop every entry stored under `tag`, returning how many were removed.
    fn invalidate_tag(&self, tag: &CacheTag) -> Result<usize, CacheError>;
}

/// In-process LRU store.
pub struct FacetStore {
    entries: RwLock<LruCache<FacetCacheKey, AggregationResult>>,
    tags: TagRegistry,
}

impl FacetStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
            tags: TagRegistry::new(),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaggedCache for FacetStore {
    fn get(&self, key: &FacetCacheKey) -> Result<Option<AggregationResult>, CacheError> {
        Ok(rw_write(&self.entries, SOURCE, "get").get(key).cloned())
    }

    fn put(
        &self,
        key: FacetCacheKey,
        tag: CacheTag,
        value: AggregationResult,
    ) -> Result<(), CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "put");
        if let Some((evicted, _)) = entries.push(key.clone(), value)
            && evicted != key
        {
            self.tags.unregister(&evicted);
            counter!(METRIC_EVICT_TOTAL).increment(1);
        }
        self.tags.register(key, tag);
        Ok(())
    }

    fn invalidate_tag(&self, tag: &CacheTag) -> Result<usize, CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "invalidate_tag");
        let removed = self
            .tags
            .unregister_tag(tag)
            .iter()
            .filter(|key| entries.pop(*key).is_some())
            .count();
        Ok(removed)
    }
}

/// Backend used when caching is switched off: every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCache;

impl TaggedCache for DisabledCache {
    fn get(&self, _key: &FacetCacheKey) -> Result<Option<AggregationResult>, CacheError> {
        Ok(None)
    }

    fn put(
        &self,
        _key: FacetCacheKey,
        _tag: CacheTag,
        _value: AggregationResult,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    fn invalidate_tag(&self, _tag: &CacheTag) -> Result<usize, CacheError> {
        Ok(0)
    }
}
