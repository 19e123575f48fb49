use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::application::filter::activation::mark_active;
use crate::application::filter::constraints::{
    ConstraintContext, QueryConstraint, default_constraints,
};
use crate::application::filter::extractor::extract;
use crate::application::filter::ordering::order_facets;
use crate::application::options::ModuleOptions;
use crate::application::pagination::{PageRequest, Paginated};
use crate::application::repos::{ContentQuery, ContentRepo, ModuleOptionsRepo, RepoError};
use crate::application::request::FilterRequest;
use crate::cache::{CacheError, CacheTag, FacetCache, FacetCacheKey};
use crate::domain::entities::ContentSummary;
use crate::domain::facets::{ActiveFilter, AggregationResult, FilterPayload};
use crate::domain::types::FilteringWhen;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Page-size bounds applied when a module does not configure `limit`, or configures too much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ListingLimits {
    pub fn page_size(&self, options: &ModuleOptions) -> u32 {
        let max = self.max_page_size.max(1);
        options
            .limit
            .unwrap_or(self.default_page_size)
            .clamp(1, max)
    }
}

/// A filtered, paginated listing plus the facets describing it.
#[derive(Debug, Clone, Serialize)]
pub struct ListingResult {
    pub module_id: String,
    pub main_page_id: i64,
    pub filtering_when: FilteringWhen,
    pub page: Paginated<ContentSummary>,
    pub filters: Option<FilterPayload>,
    pub active_filters: Vec<ActiveFilter>,
}

/// A facet payload together with the client submission mode of its module.
#[derive(Debug, Clone, Serialize)]
pub struct FilterWidget {
    pub filtering_when: FilteringWhen,
    pub payload: FilterPayload,
}

#[derive(Clone)]
pub struct ContentFilterService {
    content: Arc<dyn ContentRepo>,
    options: Arc<dyn ModuleOptionsRepo>,
    cache: FacetCache,
    constraints: Arc<[Box<dyn QueryConstraint>]>,
    limits: ListingLimits,
}

impl ContentFilterService {
    pub fn new(
        content: Arc<dyn ContentRepo>,
        options: Arc<dyn ModuleOptionsRepo>,
        cache: FacetCache,
        limits: ListingLimits,
    ) -> Self {
        Self::with_constraints(content, options, cache, limits, default_constraints())
    }

    pub fn with_constraints(
        content: Arc<dyn ContentRepo>,
        options: Arc<dyn ModuleOptionsRepo>,
        cache: FacetCache,
        limits: ListingLimits,
        constraints: Vec<Box<dyn QueryConstraint>>,
    ) -> Self {
        Self {
            content,
            options,
            cache,
            constraints: constraints.into(),
            limits,
        }
    }

    pub async fn module_options(&self, module_id: &str) -> Result<ModuleOptions, FilterError> {
        let raw = self.options.module_options(module_id).await?;
        Ok(ModuleOptions::from_raw(module_id, &raw))
    }

    /// `content_from_id` when configured, else the first blog page, else `0`.
    pub async fn resolve_main_page(&self, options: &ModuleOptions) -> Result<i64, FilterError> {
        if let Some(id) = options.content_from_id {
            return Ok(id);
        }
        let page = self.content.find_first_blog_page().await?;
        Ok(page.map_or(0, |page| page.id))
    }

    /// Facet aggregation for a main page, served from the cache when present.
    pub async fn aggregation(
        &self,
        main_page_id: i64,
        options: &ModuleOptions,
    ) -> Result<AggregationResult, FilterError> {
        let key = FacetCacheKey::new(main_page_id, options.module_id.clone());
        let tag = CacheTag::new(self.content.table_name());
        let content = Arc::clone(&self.content);

        self.cache
            .compute_or_fetch(key, tag, || async move {
                let source = content.load_facet_source(main_page_id).await?;
                Ok::<_, FilterError>(extract(&source, options))
            })
            .await
    }

    /// The facet payload for `module_id`, or `None` when filtering is off or the widget hidden.
    #[instrument(skip(self, request))]
    pub async fn filters(
        &self,
        module_id: &str,
        request: &FilterRequest,
    ) -> Result<Option<FilterPayload>, FilterError> {
        let options = self.module_options(module_id).await?;
        let main_page_id = self.resolve_main_page(&options).await?;
        self.build_payload(&options, main_page_id, request).await
    }

    /// Like [`Self::filters`], keeping the module's `filtering_when` for the renderer.
    pub async fn widget(
        &self,
        module_id: &str,
        request: &FilterRequest,
    ) -> Result<Option<FilterWidget>, FilterError> {
        let options = self.module_options(module_id).await?;
        let main_page_id = self.resolve_main_page(&options).await?;
        let payload = self.build_payload(&options, main_page_id, request).await?;
        Ok(payload.map(|payload| FilterWidget {
            filtering_when: options.filtering_when,
            payload,
        }))
    }

    /// Constrain, paginate and decorate the listing for `module_id`.
    #[instrument(skip(self, request))]
    pub async fn apply(
        &self,
        module_id: &str,
        request: &FilterRequest,
    ) -> Result<ListingResult, FilterError> {
        let options = self.module_options(module_id).await?;
        let main_page_id = self.resolve_main_page(&options).await?;

        let query = self.build_query(&options, main_page_id, request);
        let page_request =
            PageRequest::from_param(request.page(), self.limits.page_size(&options));
        let page = self
            .content
            .paginate(&query, page_request)
            .await?
            .with_query_string(&request.query_string());

        let filters = self.build_payload(&options, main_page_id, request).await?;
        let active_filters = filters
            .as_ref()
            .map(FilterPayload::active_filters)
            .unwrap_or_default();

        debug!(
            main_page_id,
            total = page.total,
            page = page.current_page,
            facets = filters.as_ref().map_or(0, |payload| payload.filters.len()),
            "listing filtered"
        );

        Ok(ListingResult {
            module_id: options.module_id.clone(),
            main_page_id,
            filtering_when: options.filtering_when,
            page,
            filters,
            active_filters,
        })
    }

    /// Drop every cached aggregation derived from the content table.
    pub fn invalidate_content(&self) -> Result<usize, FilterError> {
        let tag = CacheTag::new(self.content.table_name());
        Ok(self.cache.invalidate_tag(&tag)?)
    }

    async fn build_payload(
        &self,
        options: &ModuleOptions,
        main_page_id: i64,
        request: &FilterRequest,
    ) -> Result<Option<FilterPayload>, FilterError> {
        if !options.shows_widget() {
            debug!(
                module_id = %options.module_id,
                filtering_enabled = options.filtering_enabled,
                "facet computation skipped"
            );
            return Ok(None);
        }

        let aggregation = self.aggregation(main_page_id, options).await?;
        let activated = mark_active(&aggregation, request);
        let filters = order_facets(activated, options, request);

        Ok(Some(FilterPayload {
            filters,
            module_id: options.module_id.clone(),
        }))
    }

    fn build_query(
        &self,
        options: &ModuleOptions,
        main_page_id: i64,
        request: &FilterRequest,
    ) -> ContentQuery {
        let ctx = ConstraintContext { request, options };
        self.constraints
            .iter()
            .fold(ContentQuery::scoped_to(main_page_id), |query, constraint| {
                constraint.apply(query, &ctx)
            })
    }
}
