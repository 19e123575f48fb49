//! Tag registry.
//!
//! Tracks which cache keys belong to which invalidation tag so a whole tag
//! can be purged when its backing table changes.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::keys::{CacheTag, FacetCacheKey};
use super::lock::rw_write;

const SOURCE: &str = "cache::registry";

#[derive(Debug, Default)]
struct Mappings {
    tag_to_keys: HashMap<CacheTag, HashSet<FacetCacheKey>>,
    key_to_tag: HashMap<FacetCacheKey, CacheTag>,
}

#[derive(Debug, Default)]
pub struct TagRegistry {
    mappings: RwLock<Mappings>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `key` to `tag`, replacing any previous tag for the key.
    pub fn register(&self, key: FacetCacheKey, tag: CacheTag) {
        let mut mappings = rw_write(&self.mappings, SOURCE, "register");
        if let Some(previous) = mappings.key_to_tag.insert(key.clone(), tag.clone())
            && previous != tag
        {
            remove_key(&mut mappings.tag_to_keys, &previous, &key);
        }
        mappings.tag_to_keys.entry(tag).or_default().insert(key);
    }

    #[cfg(test)]
    fn tag_for_key(&self, key: &FacetCacheKey) -> Option<CacheTag> {
        super::lock::rw_read(&self.mappings, SOURCE, "tag_for_key")
            .key_to_tag
            .get(key)
            .cloned()
    }

    /// Forget `key`, e.g. after eviction.
    pub fn unregister(&self, key: &FacetCacheKey) {
        let mut mappings = rw_write(&self.mappings, SOURCE, "unregister");
        if let Some(tag) = mappings.key_to_tag.remove(key) {
            remove_key(&mut mappings.tag_to_keys, &tag, key);
        }
    }

    /// Remove every mapping for `tag` and return the keys that carried it.
    pub fn unregister_tag(&self, tag: &CacheTag) -> HashSet<FacetCacheKey> {
        let mut mappings = rw_write(&self.mappings, SOURCE, "unregister_tag");
        let keys = mappings.tag_to_keys.remove(tag).unwrap_or_default();
        for key in &keys {
            mappings.key_to_tag.remove(key);
        }
        keys
    }

    #[cfg(test)]
    fn key_count(&self) -> usize {
        super::lock::rw_read(&self.mappings, SOURCE, "key_count")
            .key_to_tag
            .len()
    }

    #[cfg(test)]
    fn tag_count(&self) -> usize {
        super::lock::rw_read(&self.mappings, SOURCE, "tag_count")
            .tag_to_keys
            .len()
    }
}

fn remove_key(
    tag_to_keys: &mut HashMap<CacheTag, HashSet<FacetCacheKey>>,
    tag: &CacheTag,
    key: &FacetCacheKey,
) {
    if let Some(keys) = tag_to_keys.get_mut(tag) {
        keys.remove(key);
        if keys.is_empty() {
            tag_to_keys.remove(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let registry = TagRegistry::new();
        let key = FacetCacheKey::new(1, "blog");
        registry.register(key.clone(), CacheTag::new("content"));

        assert_eq!(registry.tag_for_key(&key), Some(CacheTag::new("content")));
        assert_eq!(registry.key_count(), 1);
        assert_eq!(registry.tag_count(), 1);
    }

    #[test]
    fn retagging_moves_the_key() {
        let registry = TagRegistry::new();
        let key = FacetCacheKey::new(1, "blog");
        registry.register(key.clone(), CacheTag::new("content"));
        registry.register(key.clone(), CacheTag::new("archive"));

        assert!(registry.unregister_tag(&CacheTag::new("content")).is_empty());
        assert_eq!(registry.tag_count(), 1);
        assert!(registry.unregister_tag(&CacheTag::new("archive")).contains(&key));
    }

    #[test]
    fn unregister_cleans_up_mappings() {
        let registry = TagRegistry::new();
        let key = FacetCacheKey::new(1, "blog");
        registry.register(key.clone(), CacheTag::new("content"));
        registry.unregister(&key);

        assert_eq!(registry.key_count(), 0);
        assert_eq!(registry.tag_count(), 0);
    }

    #[test]
    fn unregister_tag_returns_every_member() {
        let registry = TagRegistry::new();
        let tag = CacheTag::new("content");
        registry.register(FacetCacheKey::new(1, "a"), tag.clone());
        registry.register(FacetCacheKey::new(1, "b"), tag.clone());
        registry.register(FacetCacheKey::new(2, "a"), CacheTag::new("other"));

        let removed = registry.unregister_tag(&tag);
        assert_eq!(removed.len(), 2);
        assert_eq!(registry.key_count(), 1);
    }
}
