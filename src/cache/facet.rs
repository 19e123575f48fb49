//! Read-through memoisation of facet extraction.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::debug;

use crate::domain::facets::AggregationResult;

use super::config::CacheConfig;
use super::keys::{CacheTag, FacetCacheKey};
use super::store::{CacheError, DisabledCache, FacetStore, TaggedCache};

pub(crate) const METRIC_HIT_TOTAL: &str = "content_filter_facet_cache_hit_total";
pub(crate) const METRIC_MISS_TOTAL: &str = "content_filter_facet_cache_miss_total";
pub(crate) const METRIC_EXTRACT_MS: &str = "content_filter_facet_extract_ms";

#[derive(Clone)]
pub struct FacetCache {
    backend: Arc<dyn TaggedCache>,
}

impl FacetCache {
    pub fn new(backend: Arc<dyn TaggedCache>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::new(Arc::new(FacetStore::new(config)))
        } else {
            Self::new(Arc::new(DisabledCache))
        }
    }

    /// Return the stored aggregation for `key`, or run `compute` and store its result.
    ///
    /// A stored empty aggregation counts as a hit. Concurrent misses for the
    /// same key may both compute; the later write replaces the earlier one.
    pub async fn compute_or_fetch<F, Fut, E>(
        &self,
        key: FacetCacheKey,
        tag: CacheTag,
        compute: F,
    ) -> Result<AggregationResult, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AggregationResult, E>>,
        E: From<CacheError>,
    {
        if let Some(cached) = self.backend.get(&key)? {
            counter!(METRIC_HIT_TOTAL).increment(1);
            debug!(
                key = %key,
                fingerprint = key.fingerprint(),
                "facet cache hit"
            );
            return Ok(cached);
        }

        counter!(METRIC_MISS_TOTAL).increment(1);
        let started_at = Instant::now();
        let computed = compute().await?;
        histogram!(METRIC_EXTRACT_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        debug!(
            key = %key,
            tag = %tag,
            fields = computed.custom_fields.len(),
            tags = computed.tags.len(),
            "facet cache miss, storing aggregation"
        );
        self.backend.put(key, tag, computed.clone())?;
        Ok(computed)
    }

    pub fn invalidate_tag(&self, tag: &CacheTag) -> Result<usize, CacheError> {
        let removed = self.backend.invalidate_tag(tag)?;
        debug!(tag = %tag, removed, "facet cache tag invalidated");
        Ok(removed)
    }
}
