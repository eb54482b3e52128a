use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use salonsearch_core::{Backend, SearchParameters, SearchRequest, SearchResponse};

use crate::middleware::RequestId;

use super::{map_search_error, ApiError, AppState};

/// `GET /api/v1/search`: search the Elasticsearch index.
pub(super) async fn search_document(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SearchRequest>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    run(&state, req_id, query, Backend::Document).await
}

/// `GET /api/v1/search/postgres`: search the relational store directly.
pub(super) async fn search_relational(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SearchRequest>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    run(&state, req_id, query, Backend::Relational).await
}

// The envelope is returned bare, without the `{data, meta}` wrapper.
async fn run(
    state: &AppState,
    req_id: RequestId,
    query: Result<Query<SearchRequest>, QueryRejection>,
    backend: Backend,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(request) = query.map_err(|e| ApiError::bad_request(req_id.0.clone(), e.body_text()))?;
    let params = SearchParameters::try_from(request)
        .map_err(|e| map_search_error(req_id.0.clone(), e.into()))?;

    state
        .service
        .search(&params, backend)
        .await
        .map(Json)
        .map_err(|e| map_search_error(req_id.0, e))
}
