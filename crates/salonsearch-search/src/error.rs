use salonsearch_core::{Backend, ValidationError};
use salonsearch_db::DbError;
use salonsearch_index::IndexError;
use thiserror::Error;

/// Failure of a search-layer operation.
///
/// `Validation` and `NotFound` are caller mistakes and safe to show as-is.
/// `BackendUnavailable` means the store could not answer this request; it is
/// never retried here. `QueryCompilation` indicates a defect, not bad input.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("salon {0} not found")]
    NotFound(i64),

    #[error("{backend} unavailable: {message}")]
    BackendUnavailable { backend: Backend, message: String },

    #[error("query compilation failed: {0}")]
    QueryCompilation(String),
}

impl SearchError {
    /// Stable machine-readable code for API error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::Validation(_) => "validation_error",
            SearchError::NotFound(_) => "not_found",
            SearchError::BackendUnavailable { .. } => "backend_unavailable",
            SearchError::QueryCompilation(_) => "internal_error",
        }
    }

    pub(crate) fn timeout(backend: Backend, after: std::time::Duration) -> Self {
        SearchError::BackendUnavailable {
            backend,
            message: format!("no answer within {}ms", after.as_millis()),
        }
    }

    /// Maps a relational failure. `NotFound` is handled by the caller, which
    /// knows the id.
    pub(crate) fn from_db(err: DbError) -> Self {
        match err {
            DbError::Encode(e) => SearchError::QueryCompilation(e.to_string()),
            other => SearchError::BackendUnavailable {
                backend: Backend::Relational,
                message: other.to_string(),
            },
        }
    }

    pub(crate) fn from_index(err: IndexError) -> Self {
        match err {
            // The engine rejecting a compiled query is a compiler defect.
            IndexError::Api { status: 400, body } => SearchError::QueryCompilation(body),
            other => SearchError::BackendUnavailable {
                backend: Backend::Document,
                message: other.to_string(),
            },
        }
    }
}
