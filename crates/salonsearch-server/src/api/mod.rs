mod admin;
mod salons;
mod search;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use salonsearch_core::FieldError;
use salonsearch_search::{SearchError, SearchService};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub service: SearchService,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    postgres: &'static str,
    elasticsearch: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: Vec::new(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    /// Malformed input that never reached the search layer, such as a
    /// non-numeric `page`.
    pub(super) fn bad_request(request_id: String, message: impl Into<String>) -> Self {
        Self::new(request_id, "validation_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "validation_error" => StatusCode::BAD_REQUEST,
            "backend_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Converts a search-layer failure into the wire error. Backend details are
/// logged, not returned.
pub(super) fn map_search_error(request_id: String, error: SearchError) -> ApiError {
    let code = error.code();
    match error {
        SearchError::Validation(v) => {
            let mut api = ApiError::new(request_id, code, v.to_string());
            api.error.details = v.errors;
            api
        }
        SearchError::NotFound(id) => ApiError::new(request_id, code, format!("salon {id} not found")),
        SearchError::BackendUnavailable { backend, message } => {
            tracing::error!(%backend, error = %message, "backend unavailable");
            ApiError::new(request_id, code, format!("{backend} is unavailable"))
        }
        SearchError::QueryCompilation(message) => {
            tracing::error!(error = %message, "search query rejected by backend");
            ApiError::new(request_id, code, "search query could not be executed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn admin_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/admin/sync", post(admin::sync_index))
        .route(
            "/api/v1/admin/cluster/health",
            get(admin::cluster_health),
        )
        .route("/api/v1/admin/cluster/stats", get(admin::cluster_stats))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/search", get(search::search_document))
        .route("/api/v1/search/postgres", get(search::search_relational))
        .route("/api/v1/salons/{id}", get(salons::get_salon))
        .route("/api/v1/categories", get(salons::list_categories));

    Router::new()
        .merge(public_routes)
        .merge(admin_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let report = state.service.health().await;
    let label = |up: bool| if up { "ok" } else { "unavailable" };

    let (status, overall) = if report.is_healthy() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(ApiResponse {
            data: HealthData {
                status: overall,
                postgres: label(report.postgres),
                elasticsearch: label(report.elasticsearch),
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
