//! Facet pipeline: extract, cache, activate, order; plus listing constraints.
//!
//! ```text
//! children of main page -> extract -> FacetCache -> mark_active -> order_facets -> FilterPayload
//! request + options -> constraints -> ContentQuery -> paginate
//! ```

pub mod activation;
pub mod constraints;
pub mod extractor;
pub mod ordering;
mod service;

pub use activation::{ActivatedField, mark_active};
pub use constraints::{ConstraintContext, QueryConstraint, default_constraints};
pub use extractor::extract;
pub use ordering::order_facets;
pub use service::{
    ContentFilterService, FilterError, FilterWidget, ListingLimits, ListingResult,
};
