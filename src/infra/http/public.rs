use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use crate::{
    application::{
        error::HttpError,
        filter::{ContentFilterService, ListingResult},
        request::FilterRequest,
    },
    presentation::views::{FILTER_WIDGET_TEMPLATE, RenderedFilters, render_filters},
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub filters: ContentFilterService,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/modules/{module_id}/filters", get(module_filters))
        .route("/api/modules/{module_id}/listing", get(module_listing))
        .route("/_health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

fn parse_request(query: Option<String>) -> FilterRequest {
    FilterRequest::from_query(query.as_deref().unwrap_or_default())
}

async fn module_filters(
    State(state): State<HttpState>,
    Path(module_id): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let request = parse_request(query);
    let widget = match state.filters.widget(&module_id, &request).await {
        Ok(Some(widget)) => widget,
        Ok(None) => return StatusCode::NO_CONTENT.into_response(),
        Err(err) => return HttpError::from(err).into_response(),
    };

    match render_filters(
        widget.payload,
        widget.filtering_when,
        Some(FILTER_WIDGET_TEMPLATE),
    ) {
        Ok(RenderedFilters::Markup(html)) => Html(html).into_response(),
        Ok(RenderedFilters::Data(payload)) => Json(payload).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn module_listing(
    State(state): State<HttpState>,
    Path(module_id): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<ListingResult>, HttpError> {
    let request = parse_request(query);
    let listing = state.filters.apply(&module_id, &request).await?;
    Ok(Json(listing))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
