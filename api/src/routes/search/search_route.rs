//! GET /search/: full-text search across both indices with highlighted content.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderMap,
};
use tracing::{debug, error};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::search::{search_request::SearchRequest, search_response::SearchResponse},
};

/// Handler: GET /search/?query=...
///
/// # Example
/// ```bash
/// curl 'http://127.0.0.1:8000/search/?query=hello'
/// ```
pub async fn search_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<SearchRequest>, QueryRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Query(p) = query?;
    let request_id = headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    debug!(
        request_id = %request_id,
        query = %p.query,
        "search_route: start"
    );

    let page = state.engine.search(&p.query).await.inspect_err(|err| {
        error!(
            request_id = %request_id,
            error = %err,
            "search_route: search failed"
        );
    })?;

    let body = SearchResponse::from_page(page, &p.query);
    debug!(
        request_id = %request_id,
        size = body.size,
        hits = body.result.len(),
        "search_route: success"
    );

    Ok(Json(body))
}
