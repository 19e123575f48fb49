//! Facet aggregation cache.
//!
//! Aggregations are expensive to rebuild (a full scan of the children of a
//! main page) and change only when content is edited, so they are memoised
//! per (main page, module) and grouped under the content table's tag.
//!
//! ```toml
//! [cache]
//! enabled = true
//! capacity = 256
//! ```

mod config;
mod facet;
mod keys;
mod lock;
mod registry;
mod store;

pub use config::CacheConfig;
pub use facet::FacetCache;
pub use keys::{CacheTag, FacetCacheKey};
pub use store::{CacheError, DisabledCache, FacetStore, TaggedCache};

pub(crate) mod metric_names {
    pub(crate) use super::facet::{METRIC_EXTRACT_MS, METRIC_HIT_TOTAL, METRIC_MISS_TOTAL};
    pub(crate) use super::store::METRIC_EVICT_TOTAL;
}
