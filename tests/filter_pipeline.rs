use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use content_filter::application::filter::{ContentFilterService, ListingLimits};
use content_filter::application::pagination::{PageRequest, Paginated};
use content_filter::application::repos::{
    ContentQuery, ContentRepo, FacetSource, FieldValuePredicate, ModuleOptionsRepo,
    NumericRangePredicate, RepoError,
};
use content_filter::application::request::FilterRequest;
use content_filter::cache::{CacheConfig, FacetCache};
use content_filter::domain::entities::{
    ContentItem, ContentSummary, CustomField, CustomFieldValue, PageRecord, TagRecord,
};
use content_filter::domain::facets::{FacetControl, FilterPayload, PriceRange};
use content_filter::domain::types::FieldType;

const BLOG_PAGE: i64 = 7;

/// Content repo whose items can change between calls, counting facet scans.
struct ScriptedRepo {
    items: Mutex<Vec<ContentItem>>,
    fields: Vec<CustomField>,
    blog_page: Option<PageRecord>,
    facet_loads: AtomicUsize,
    last_query: Mutex<Option<ContentQuery>>,
}

impl ScriptedRepo {
    fn new(items: Vec<ContentItem>, fields: Vec<CustomField>) -> Self {
        Self {
            items: Mutex::new(items),
            fields,
            blog_page: Some(PageRecord {
                id: BLOG_PAGE,
                title: "Blog".to_string(),
                content_type: "page".to_string(),
                subtype: "dynamic".to_string(),
                is_shop: false,
            }),
            facet_loads: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    fn without_blog_page(mut self) -> Self {
        self.blog_page = None;
        self
    }

    fn facet_loads(&self) -> usize {
        self.facet_loads.load(Ordering::SeqCst)
    }

    fn push_value(&self, content_id: i64, value: CustomFieldValue) {
        let mut items = self.items.lock().expect("items lock");
        let item = items
            .iter_mut()
            .find(|item| item.id == content_id)
            .expect("known item");
        item.field_values.push(value);
    }

    fn last_query(&self) -> ContentQuery {
        self.last_query
            .lock()
            .expect("query lock")
            .clone()
            .expect("paginate was called")
    }
}

#[async_trait]
impl ContentRepo for ScriptedRepo {
    async fn load_facet_source(&self, parent_id: i64) -> Result<FacetSource, RepoError> {
        self.facet_loads.fetch_add(1, Ordering::SeqCst);
        let items = self
            .items
            .lock()
            .expect("items lock")
            .iter()
            .filter(|item| item.parent_id == parent_id)
            .cloned()
            .collect();
        Ok(FacetSource {
            items,
            fields: self.fields.clone(),
        })
    }

    async fn paginate(
        &self,
        query: &ContentQuery,
        page: PageRequest,
    ) -> Result<Paginated<ContentSummary>, RepoError> {
        *self.last_query.lock().expect("query lock") = Some(query.clone());
        Ok(Paginated::new(Vec::new(), page, 0))
    }

    async fn find_first_blog_page(&self) -> Result<Option<PageRecord>, RepoError> {
        Ok(self.blog_page.clone())
    }

    fn table_name(&self) -> &'static str {
        "content"
    }
}

struct StaticOptions(HashMap<String, HashMap<String, String>>);

impl StaticOptions {
    fn single(module_id: &str, options: &[(&str, &str)]) -> Self {
        let options = options
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self(HashMap::from([(module_id.to_string(), options)]))
    }
}

#[async_trait]
impl ModuleOptionsRepo for StaticOptions {
    async fn module_options(&self, module_id: &str) -> Result<HashMap<String, String>, RepoError> {
        Ok(self.0.get(module_id).cloned().unwrap_or_default())
    }
}

fn field(id: i64, key: &str, field_type: FieldType) -> CustomField {
    CustomField {
        id,
        name: key.to_uppercase(),
        name_key: key.to_string(),
        field_type,
    }
}

fn value(id: i64, field: i64, content: i64, raw: Option<&str>) -> CustomFieldValue {
    CustomFieldValue {
        id,
        custom_field_id: field,
        content_id: content,
        value: raw.map(str::to_string),
    }
}

fn item(id: i64, values: Vec<CustomFieldValue>) -> ContentItem {
    ContentItem {
        id,
        parent_id: BLOG_PAGE,
        tags: vec![TagRecord {
            id: 1,
            slug: "news".to_string(),
            name: "News".to_string(),
        }],
        field_values: values,
    }
}

fn fixture() -> ScriptedRepo {
    ScriptedRepo::new(
        vec![
            item(
                1,
                vec![
                    value(1, 1, 1, Some("red")),
                    value(2, 2, 1, Some("M")),
                    value(3, 3, 1, Some("10")),
                    value(4, 4, 1, None),
                ],
            ),
            item(
                2,
                vec![
                    value(5, 1, 2, Some("blue")),
                    value(6, 2, 2, Some("L")),
                    value(7, 3, 2, Some("2")),
                ],
            ),
            item(
                3,
                vec![
                    value(8, 1, 3, Some("green")),
                    value(9, 3, 3, Some("100")),
                    value(10, 5, 3, Some("round")),
                ],
            ),
        ],
        vec![
            field(1, "color", FieldType::Text),
            field(2, "size", FieldType::Text),
            field(3, "price", FieldType::Price),
            field(4, "notes", FieldType::Text),
            field(5, "shape", FieldType::Text),
        ],
    )
}

const ENABLED: &[(&str, &str)] = &[
    ("filtering_the_results", "1"),
    ("filtering_by_custom_fields_color", "1"),
    ("filtering_by_custom_fields_size", "1"),
    ("filtering_by_custom_fields_price", "1"),
    ("filtering_by_custom_fields_notes", "1"),
    ("filtering_by_custom_fields_control_type_price", "price"),
];

fn service(repo: Arc<ScriptedRepo>, options: StaticOptions) -> ContentFilterService {
    ContentFilterService::new(
        repo,
        Arc::new(options),
        FacetCache::from_config(&CacheConfig::default()),
        ListingLimits::default(),
    )
}

async fn payload(service: &ContentFilterService, query: &str) -> FilterPayload {
    service
        .filters("blog", &FilterRequest::from_query(query))
        .await
        .expect("filters")
        .expect("widget shown")
}

fn keys(payload: &FilterPayload) -> Vec<&str> {
    payload
        .filters
        .iter()
        .map(|facet| facet.name_key.as_str())
        .collect()
}

fn values(payload: &FilterPayload, key: &str) -> Vec<String> {
    payload
        .facet(key)
        .expect("facet present")
        .options
        .iter()
        .map(|option| option.value.clone())
        .collect()
}

#[tokio::test]
async fn facets_without_values_are_never_emitted() {
    let repo = Arc::new(fixture());
    let service = service(repo, StaticOptions::single("blog", ENABLED));

    let payload = payload(&service, "").await;

    assert_eq!(keys(&payload), ["color", "size", "price"]);
    assert!(payload.facet("notes").is_none());
    assert!(payload.facet("shape").is_none());
    assert!(payload.filters.iter().all(|facet| !facet.options.is_empty()));
}

#[tokio::test]
async fn repeated_requests_yield_identical_payloads() {
    let repo = Arc::new(fixture());
    let service = service(repo.clone(), StaticOptions::single("blog", ENABLED));

    let first = payload(&service, "filters[color][]=blue").await;
    let second = payload(&service, "filters[color][]=blue").await;

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_value(&first).expect("json"),
        serde_json::to_value(&second).expect("json")
    );
    assert_eq!(repo.facet_loads(), 1);
}

#[tokio::test]
async fn picked_values_move_to_the_front_without_reordering_facets() {
    let mut options = ENABLED.to_vec();
    options.push(("filtering_show_picked_first", "1"));
    let service = service(Arc::new(fixture()), StaticOptions::single("blog", &options));

    let payload = payload(&service, "filters[color][]=green&filters[color][]=blue").await;

    assert_eq!(keys(&payload), ["color", "size", "price"]);
    assert_eq!(values(&payload, "color"), ["blue", "green", "red"]);
    let color = payload.facet("color").expect("color");
    let active: Vec<_> = color.active_values().collect();
    assert_eq!(active, ["blue", "green"]);
}

#[tokio::test]
async fn explicit_order_reindexes_and_drops_unlisted_facets() {
    let mut options = ENABLED.to_vec();
    options.push(("filtering_by_custom_fields_order", "size,missing,color"));
    let service = service(Arc::new(fixture()), StaticOptions::single("blog", &options));

    let payload = payload(&service, "").await;

    assert_eq!(keys(&payload), ["size", "color"]);
    let size = payload.facet("size").expect("size");
    let color = payload.facet("color").expect("color");
    assert_eq!((size.position, size.is_first), (0, true));
    assert_eq!((color.position, color.is_first), (1, false));
}

#[tokio::test]
async fn price_bounds_follow_natural_order_and_request_overrides() {
    let service = service(Arc::new(fixture()), StaticOptions::single("blog", ENABLED));

    let untouched = payload(&service, "").await;
    assert_eq!(
        untouched.facet("price").expect("price").control,
        FacetControl::Price(PriceRange {
            min_price: 2,
            max_price: 100,
            from_price: 2.0,
            to_price: 100.0,
        })
    );

    let narrowed = payload(&service, "min_price=5").await;
    assert_eq!(
        narrowed.facet("price").expect("price").control,
        FacetControl::Price(PriceRange {
            min_price: 2,
            max_price: 100,
            from_price: 5.0,
            to_price: 100.0,
        })
    );
}

#[tokio::test]
async fn cached_aggregation_is_served_until_invalidated() {
    let repo = Arc::new(fixture());
    let service = service(repo.clone(), StaticOptions::single("blog", ENABLED));

    let before = payload(&service, "").await;
    repo.push_value(2, value(11, 1, 2, Some("purple")));

    let cached = payload(&service, "").await;
    assert_eq!(cached, before);
    assert_eq!(repo.facet_loads(), 1);

    assert_eq!(service.invalidate_content().expect("invalidate"), 1);
    let refreshed = payload(&service, "").await;
    assert_eq!(values(&refreshed, "color"), ["red", "blue", "purple", "green"]);
    assert_eq!(repo.facet_loads(), 2);
}

#[tokio::test]
async fn disabled_filtering_never_extracts() {
    let repo = Arc::new(fixture());
    let service = service(
        repo.clone(),
        StaticOptions::single(
            "blog",
            &[
                ("filtering_the_results", "0"),
                ("filtering_by_custom_fields_color", "1"),
            ],
        ),
    );
    let request = FilterRequest::from_query("filters[color][]=red");

    assert!(service.filters("blog", &request).await.expect("filters").is_none());

    let listing = service.apply("blog", &request).await.expect("listing");
    assert!(listing.filters.is_none());
    assert!(repo.last_query().field_values.is_empty());
    assert_eq!(repo.facet_loads(), 0);
}

#[tokio::test]
async fn hidden_widget_still_filters_the_listing() {
    let mut options = ENABLED.to_vec();
    options.push(("disable_filter", "1"));
    let repo = Arc::new(fixture());
    let service = service(repo.clone(), StaticOptions::single("blog", &options));

    let listing = service
        .apply("blog", &FilterRequest::from_query("filters[color][]=red"))
        .await
        .expect("listing");

    assert!(listing.filters.is_none());
    assert_eq!(
        repo.last_query().field_values,
        [FieldValuePredicate {
            name_key: "color".to_string(),
            values: vec!["red".to_string()],
        }]
    );
    assert_eq!(repo.facet_loads(), 0);
}

#[tokio::test]
async fn listing_query_is_scoped_and_constrained() {
    let repo = Arc::new(fixture());
    let service = service(repo.clone(), StaticOptions::single("blog", ENABLED));

    let listing = service
        .apply(
            "blog",
            &FilterRequest::from_query(
                "filters[color][]=red&filters[shape][]=round&min_price=5&tags=news&categories=3&page=2",
            ),
        )
        .await
        .expect("listing");

    assert_eq!(listing.main_page_id, BLOG_PAGE);
    assert_eq!(listing.page.current_page, 2);
    assert!(listing.filters.is_some());
    assert_eq!(listing.active_filters.len(), 1);
    assert_eq!(listing.active_filters[0].name_key, "color");
    assert_eq!(listing.active_filters[0].values, ["red"]);

    let query = repo.last_query();
    assert_eq!(query.parent_id, Some(BLOG_PAGE));
    assert_eq!(query.tag_slugs, ["news"]);
    assert_eq!(query.category_ids, [3]);
    assert_eq!(query.field_values.len(), 1);
    assert_eq!(query.field_values[0].name_key, "color");
    assert_eq!(
        query.numeric_ranges,
        [NumericRangePredicate {
            name_keys: vec!["price".to_string()],
            min: Some(5.0),
            max: None,
        }]
    );
}

#[tokio::test]
async fn main_page_prefers_configured_source_then_blog_then_zero() {
    let repo = Arc::new(fixture().without_blog_page());
    let service = service(
        repo.clone(),
        StaticOptions(HashMap::from([
            (
                "configured".to_string(),
                HashMap::from([("content_from_id".to_string(), "42".to_string())]),
            ),
            ("fallback".to_string(), HashMap::new()),
        ])),
    );

    let configured = service
        .module_options("configured")
        .await
        .expect("options");
    assert_eq!(
        service.resolve_main_page(&configured).await.expect("page"),
        42
    );

    let fallback = service.module_options("fallback").await.expect("options");
    assert_eq!(service.resolve_main_page(&fallback).await.expect("page"), 0);

    let with_blog = service_with_blog_page();
    let options = with_blog.module_options("fallback").await.expect("options");
    assert_eq!(
        with_blog.resolve_main_page(&options).await.expect("page"),
        BLOG_PAGE
    );
}

fn service_with_blog_page() -> ContentFilterService {
    service(
        Arc::new(fixture()),
        StaticOptions(HashMap::from([("fallback".to_string(), HashMap::new())])),
    )
}
