//! Repository traits describing the content store and module configuration.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::{PageRequest, Paginated};
use crate::domain::entities::{ContentItem, ContentSummary, CustomField, PageRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }
}

/// Content items under one parent together with the metadata of every field they use.
#[derive(Debug, Clone, Default)]
pub struct FacetSource {
    pub items: Vec<ContentItem>,
    pub fields: Vec<CustomField>,
}

impl FacetSource {
    pub fn field(&self, id: i64) -> Option<&CustomField> {
        self.fields.iter().find(|field| field.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// Require at least one of `values` on a field identified by `name_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValuePredicate {
    pub name_key: String,
    pub values: Vec<String>,
}

/// Inclusive numeric bounds checked against every field in `name_keys`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRangePredicate {
    pub name_keys: Vec<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Inclusive calendar bounds checked against every field in `name_keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangePredicate {
    pub name_keys: Vec<String>,
    pub from: Option<time::Date>,
    pub to: Option<time::Date>,
}

/// Declarative listing query assembled by query constraints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentQuery {
    pub parent_id: Option<i64>,
    pub tag_slugs: Vec<String>,
    pub category_ids: Vec<i64>,
    pub search: Option<String>,
    pub field_values: Vec<FieldValuePredicate>,
    pub numeric_ranges: Vec<NumericRangePredicate>,
    pub date_ranges: Vec<DateRangePredicate>,
    pub sort: Option<SortOrder>,
}

impl ContentQuery {
    pub fn scoped_to(parent_id: i64) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// Children of `parent_id` with tags and field values eagerly loaded.
    async fn load_facet_source(&self, parent_id: i64) -> Result<FacetSource, RepoError>;

    /// Fails with [`RepoError::InvalidQuery`] when `query` is not scoped to a parent page.
    async fn paginate(
        &self,
        query: &ContentQuery,
        page: PageRequest,
    ) -> Result<Paginated<ContentSummary>, RepoError>;

    /// First dynamic, non-shop page; used when a module has no explicit source page.
    async fn find_first_blog_page(&self) -> Result<Option<PageRecord>, RepoError>;

    /// Name of the backing table, used to tag cache entries derived from it.
    fn table_name(&self) -> &'static str;
}

#[async_trait]
pub trait ModuleOptionsRepo: Send + Sync {
    /// Every stored option for `module_id`; an unknown module yields an empty map.
    async fn module_options(&self, module_id: &str) -> Result<HashMap<String, String>, RepoError>;
}
