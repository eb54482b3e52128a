use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension, Json,
};
use salonsearch_core::{Category, Salon};

use crate::middleware::RequestId;

use super::{map_search_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_salon(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<Salon>>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::bad_request(req_id.0.clone(), e.body_text()))?;

    let salon = state
        .service
        .get_by_id(id)
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data: salon,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let data = state
        .service
        .categories()
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
