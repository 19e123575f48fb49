//! Facet cache configuration.

use std::num::NonZeroUsize;

use serde::Deserialize;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Store aggregations between requests. When off every request re-extracts.
    pub enabled: bool,
    /// Maximum (main page, module) entries kept before LRU eviction.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            capacity: settings.capacity,
        }
    }
}

impl CacheConfig {
    /// Capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.capacity, 256);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.capacity_non_zero().get(), 1);
    }

    #[test]
    fn partial_tables_fill_defaults() {
        let config: CacheConfig = toml::from_str("capacity = 8").expect("valid toml");
        assert!(config.enabled);
        assert_eq!(config.capacity, 8);
    }
}
