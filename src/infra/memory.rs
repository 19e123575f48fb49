//! TOML-seeded, read-only content store.
//!
//! ```toml
//! [[pages]]
//! id = 1
//! title = "Blog"
//! content_type = "page"
//! subtype = "dynamic"
//!
//! [[custom_fields]]
//! id = 1
//! name = "Color"
//! name_key = "color"
//! type = "text"
//!
//! [[tags]]
//! id = 1
//! slug = "news"
//! name = "News"
//!
//! [[categories]]
//! id = 1
//! title = "Seasonal"
//!
//! [[content]]
//! id = 10
//! parent_id = 1
//! title = "Spring collection"
//! url = "/blog/spring-collection"
//! tags = [1]
//! categories = [1]
//! values = [{ field = 1, value = "red" }]
//!
//! [modules.blog]
//! filtering_the_results = "1"
//! filtering_by_custom_fields_color = "1"
//! ```

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::application::pagination::{PageRequest, Paginated};
use crate::application::repos::{
    ContentQuery, ContentRepo, DateRangePredicate, FacetSource, ModuleOptionsRepo,
    NumericRangePredicate, RepoError, SortDirection, SortKey,
};
use crate::domain::catalog::{ContentCatalog, StoredContent};
use crate::domain::entities::{
    CategoryRecord, ContentSummary, CustomField, CustomFieldValue, PageRecord, TagRecord,
};
use crate::domain::error::DomainError;
use crate::domain::types::FieldType;
use crate::util::scalar::{leading_number, parse_date};

use super::error::InfraError;

const CONTENT_TABLE: &str = "content";

#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    catalog: ContentCatalog,
    modules: HashMap<String, HashMap<String, String>>,
}

impl InMemoryContentStore {
    pub fn new(
        catalog: ContentCatalog,
        modules: HashMap<String, HashMap<String, String>>,
    ) -> Self {
        Self { catalog, modules }
    }

    pub async fn load(path: &Path) -> Result<Self, InfraError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let store = Self::from_toml_str(&raw).map_err(|err| match err {
            SeedError::Integrity(err) => InfraError::inconsistent_seed(path, &err),
            SeedError::Parse(err) => InfraError::seed(path, err.to_string()),
        })?;
        info!(
            path = %path.display(),
            pages = store.catalog.pages().len(),
            contents = store.catalog.contents().len(),
            modules = store.modules.len(),
            "content seed loaded"
        );
        Ok(store)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, SeedError> {
        let seed: SeedFile = toml::from_str(raw)?;
        seed.into_store()
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    fn matches(&self, content: &StoredContent, query: &ContentQuery) -> bool {
        if query
            .parent_id
            .is_some_and(|parent| content.summary.parent_id != parent)
        {
            return false;
        }

        if !query.tag_slugs.is_empty()
            && !content
                .tags
                .iter()
                .any(|tag| query.tag_slugs.iter().any(|slug| *slug == tag.slug))
        {
            return false;
        }

        if !query.category_ids.is_empty() && !content.in_any_category(&query.category_ids) {
            return false;
        }

        if query
            .search
            .as_deref()
            .is_some_and(|term| !matches_search(&content.summary, term))
        {
            return false;
        }

        let field_values_match = query.field_values.iter().all(|predicate| {
            self.catalog
                .values_for_key(content, &predicate.name_key)
                .any(|raw| predicate.values.iter().any(|wanted| wanted == raw))
        });
        if !field_values_match {
            return false;
        }

        query
            .numeric_ranges
            .iter()
            .all(|predicate| self.within_numeric_range(content, predicate))
            && query
                .date_ranges
                .iter()
                .all(|predicate| self.within_date_range(content, predicate))
    }

    fn within_numeric_range(&self, content: &StoredContent, predicate: &NumericRangePredicate) -> bool {
        predicate.name_keys.iter().any(|key| {
            self.catalog
                .values_for_key(content, key)
                .filter_map(leading_number)
                .any(|number| {
                    predicate.min.is_none_or(|min| number >= min)
                        && predicate.max.is_none_or(|max| number <= max)
                })
        })
    }

    fn within_date_range(&self, content: &StoredContent, predicate: &DateRangePredicate) -> bool {
        predicate.name_keys.iter().any(|key| {
            self.catalog
                .values_for_key(content, key)
                .filter_map(parse_date)
                .any(|date| {
                    predicate.from.is_none_or(|from| date >= from)
                        && predicate.to.is_none_or(|to| date <= to)
                })
        })
    }
}

fn matches_search(summary: &ContentSummary, term: &str) -> bool {
    let needle = term.to_lowercase();
    [
        Some(summary.title.as_str()),
        summary.content.as_deref(),
        summary.content_body.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|haystack| haystack.to_lowercase().contains(&needle))
}

fn compare_summaries(left: &ContentSummary, right: &ContentSummary, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => left.id.cmp(&right.id),
        SortKey::Title => left
            .title
            .to_lowercase()
            .cmp(&right.title.to_lowercase())
            .then(left.id.cmp(&right.id)),
    }
}

#[async_trait]
impl ContentRepo for InMemoryContentStore {
    async fn load_facet_source(&self, parent_id: i64) -> Result<FacetSource, RepoError> {
        let items: Vec<_> = self
            .catalog
            .children_of(parent_id)
            .map(StoredContent::to_item)
            .collect();

        let mut seen = HashSet::new();
        let fields = items
            .iter()
            .flat_map(|item| item.field_values.iter())
            .filter(|value| seen.insert(value.custom_field_id))
            .filter_map(|value| self.catalog.field(value.custom_field_id).cloned())
            .collect();

        Ok(FacetSource { items, fields })
    }

    async fn paginate(
        &self,
        query: &ContentQuery,
        page: PageRequest,
    ) -> Result<Paginated<ContentSummary>, RepoError> {
        if query.parent_id.is_none() {
            return Err(RepoError::invalid_query(
                "listing query is not scoped to a parent page",
            ));
        }

        let mut matched: Vec<ContentSummary> = self
            .catalog
            .contents()
            .iter()
            .filter(|content| self.matches(content, query))
            .map(|content| content.summary.clone())
            .collect();

        if let Some(sort) = query.sort {
            matched.sort_by(|left, right| {
                let ordering = compare_summaries(left, right, sort.key);
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        Ok(Paginated::from_slice(matched, page))
    }

    async fn find_first_blog_page(&self) -> Result<Option<PageRecord>, RepoError> {
        Ok(self
            .catalog
            .pages()
            .iter()
            .find(|page| page.is_blog_root())
            .cloned())
    }

    fn table_name(&self) -> &'static str {
        CONTENT_TABLE
    }
}

#[async_trait]
impl ModuleOptionsRepo for InMemoryContentStore {
    async fn module_options(&self, module_id: &str) -> Result<HashMap<String, String>, RepoError> {
        Ok(self.modules.get(module_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("malformed seed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Integrity(#[from] DomainError),
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SeedFile {
    pages: Vec<SeedPage>,
    custom_fields: Vec<SeedField>,
    tags: Vec<TagRecord>,
    categories: Vec<CategoryRecord>,
    content: Vec<SeedContent>,
    modules: HashMap<String, HashMap<String, toml::Value>>,
}

#[derive(Debug, Deserialize)]
struct SeedPage {
    id: i64,
    title: String,
    #[serde(default = "default_content_type")]
    content_type: String,
    #[serde(default)]
    subtype: String,
    #[serde(default)]
    is_shop: bool,
}

#[derive(Debug, Deserialize)]
struct SeedField {
    id: i64,
    name: String,
    name_key: String,
    #[serde(rename = "type", default = "default_field_type")]
    field_type: FieldType,
}

#[derive(Debug, Deserialize)]
struct SeedContent {
    id: i64,
    parent_id: i64,
    title: String,
    #[serde(default)]
    url: String,
    content: Option<String>,
    content_body: Option<String>,
    #[serde(default)]
    tags: Vec<i64>,
    #[serde(default)]
    categories: Vec<i64>,
    #[serde(default)]
    values: Vec<SeedValue>,
}

#[derive(Debug, Deserialize)]
struct SeedValue {
    field: i64,
    value: Option<toml::Value>,
}

fn default_content_type() -> String {
    "page".to_string()
}

fn default_field_type() -> FieldType {
    FieldType::Text
}

impl SeedFile {
    fn into_store(self) -> Result<InMemoryContentStore, SeedError> {
        let mut tags_by_id = HashMap::with_capacity(self.tags.len());
        for tag in self.tags {
            let id = tag.id;
            if tags_by_id.insert(id, tag).is_some() {
                return Err(DomainError::duplicate("tag", id).into());
            }
        }

        let mut categories_by_id = HashMap::with_capacity(self.categories.len());
        for category in self.categories {
            let id = category.id;
            if categories_by_id.insert(id, category).is_some() {
                return Err(DomainError::duplicate("category", id).into());
            }
        }

        let pages = self
            .pages
            .into_iter()
            .map(|page| PageRecord {
                id: page.id,
                title: page.title,
                content_type: page.content_type,
                subtype: page.subtype,
                is_shop: page.is_shop,
            })
            .collect();

        let fields = self
            .custom_fields
            .into_iter()
            .map(|field| CustomField {
                id: field.id,
                name: field.name,
                name_key: field.name_key,
                field_type: field.field_type,
            })
            .collect();

        let mut next_value_id = 1;
        let mut contents = Vec::with_capacity(self.content.len());
        for entry in self.content {
            let tags = entry
                .tags
                .iter()
                .map(|tag_id| {
                    tags_by_id
                        .get(tag_id)
                        .cloned()
                        .ok_or_else(|| DomainError::dangling("content", entry.id, "tag", *tag_id))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let categories = entry
                .categories
                .iter()
                .map(|category_id| {
                    categories_by_id.get(category_id).cloned().ok_or_else(|| {
                        DomainError::dangling("content", entry.id, "category", *category_id)
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let field_values = entry
                .values
                .into_iter()
                .map(|value| {
                    let id = next_value_id;
                    next_value_id += 1;
                    CustomFieldValue {
                        id,
                        custom_field_id: value.field,
                        content_id: entry.id,
                        value: value.value.as_ref().and_then(scalar_text),
                    }
                })
                .collect();

            contents.push(StoredContent {
                summary: ContentSummary {
                    id: entry.id,
                    parent_id: entry.parent_id,
                    url: entry.url,
                    title: entry.title,
                    content: entry.content,
                    content_body: entry.content_body,
                },
                tags,
                categories,
                field_values,
            });
        }

        let catalog = ContentCatalog::build(pages, fields, contents)?;

        let modules = self
            .modules
            .into_iter()
            .map(|(module_id, options)| {
                let options = options
                    .into_iter()
                    .filter_map(|(key, value)| match scalar_text(&value) {
                        Some(text) => Some((key, text)),
                        None => {
                            warn!(
                                module_id = %module_id,
                                key = %key,
                                "ignoring non-scalar module option"
                            );
                            None
                        }
                    })
                    .collect();
                (module_id, options)
            })
            .collect();

        Ok(InMemoryContentStore::new(catalog, modules))
    }
}

/// Render scalar TOML values the way a string-typed option table stores them.
fn scalar_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(text) => Some(text.clone()),
        toml::Value::Integer(number) => Some(number.to_string()),
        toml::Value::Float(number) => Some(number.to_string()),
        toml::Value::Boolean(flag) => Some(if *flag { "1" } else { "0" }.to_string()),
        toml::Value::Datetime(datetime) => Some(datetime.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
