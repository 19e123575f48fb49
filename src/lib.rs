//! Facetted filtering for CMS blog listings.
//!
//! Facets are extracted from the children of a module's main page, memoised in
//! [`cache::FacetCache`], marked against the current request and ordered for
//! rendering. Listings are narrowed by the same request through the query
//! constraints in [`application::filter::constraints`].

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
