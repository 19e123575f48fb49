use std::collections::HashSet;
use std::sync::Arc;

use metrics_util::debugging::DebuggingRecorder;

use content_filter::application::filter::{ContentFilterService, ListingLimits};
use content_filter::application::request::FilterRequest;
use content_filter::cache::{
    CacheConfig, CacheTag, FacetCache, FacetCacheKey, FacetStore, TaggedCache,
};
use content_filter::domain::facets::AggregationResult;
use content_filter::infra::memory::InMemoryContentStore;

const SEED: &str = r#"
[[pages]]
id = 1
title = "Blog"
subtype = "dynamic"

[[custom_fields]]
id = 1
name = "Color"
name_key = "color"

[[content]]
id = 10
parent_id = 1
title = "Post"
values = [{ field = 1, value = "red" }]

[modules.blog]
filtering_the_results = "1"
filtering_by_custom_fields_color = "1"
"#;

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // Miss, extract and hit through the service.
    let store = Arc::new(InMemoryContentStore::from_toml_str(SEED).expect("seed"));
    let service = ContentFilterService::new(
        store.clone(),
        store,
        FacetCache::from_config(&CacheConfig::default()),
        ListingLimits::default(),
    );
    let request = FilterRequest::from_query("");
    for _ in 0..2 {
        let payload = service
            .filters("blog", &request)
            .await
            .expect("filters")
            .expect("widget shown");
        assert_eq!(payload.filters.len(), 1);
    }

    // Capacity eviction on a single-slot store.
    let tiny = FacetStore::new(&CacheConfig {
        enabled: true,
        capacity: 1,
    });
    let tag = CacheTag::new("content");
    tiny.put(FacetCacheKey::new(1, "a"), tag.clone(), AggregationResult::default())
        .expect("put");
    tiny.put(FacetCacheKey::new(2, "b"), tag, AggregationResult::default())
        .expect("put");
    assert_eq!(tiny.len(), 1);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "content_filter_facet_cache_hit_total",
        "content_filter_facet_cache_miss_total",
        "content_filter_facet_cache_evict_total",
        "content_filter_facet_extract_ms",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
