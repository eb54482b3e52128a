//! Index maintenance routes. Mounted behind bearer auth.

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_search_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SyncData {
    pub indexed: usize,
}

/// `POST /api/v1/admin/sync`: rebuild the index from Postgres.
pub(super) async fn sync_index(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SyncData>>, ApiError> {
    let indexed = state
        .service
        .reindex()
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), e))?;

    tracing::info!(indexed, request_id = %req_id.0, "admin sync finished");
    Ok(Json(ApiResponse {
        data: SyncData { indexed },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn cluster_health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let data = state
        .service
        .cluster_health()
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn cluster_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let data = state
        .service
        .index_stats()
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
