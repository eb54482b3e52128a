//! Entry points used by the HTTP server and the CLI.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use salonsearch_core::{Backend, Category, Salon, SearchParameters, SearchResponse};
use salonsearch_db::DbError;
use salonsearch_index::IndexClient;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::backend::{DocumentBackend, RelationalBackend, SearchBackend};
use crate::error::SearchError;

/// Reachability of both stores, for health endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub postgres: bool,
    pub elasticsearch: bool,
}

impl HealthReport {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.postgres && self.elasticsearch
    }
}

/// Runs `fut` under `limit`. On expiry the future is dropped, which cancels
/// the in-flight query, and the backend is reported unavailable.
///
/// # Errors
///
/// Returns the future's own error, or [`SearchError::BackendUnavailable`] on
/// timeout.
pub async fn with_deadline<T, F>(backend: Backend, limit: Duration, fut: F) -> Result<T, SearchError>
where
    F: Future<Output = Result<T, SearchError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(%backend, timeout_ms = limit.as_millis(), "backend call timed out");
            Err(SearchError::timeout(backend, limit))
        }
    }
}

/// Search, detail and index-maintenance operations over both stores.
///
/// Cheap to clone; all state is shared handles.
#[derive(Clone)]
pub struct SearchService {
    relational: Arc<dyn SearchBackend>,
    document: Arc<dyn SearchBackend>,
    pool: PgPool,
    index: IndexClient,
    query_timeout: Duration,
}

impl SearchService {
    #[must_use]
    pub fn new(pool: PgPool, index: IndexClient, query_timeout: Duration) -> Self {
        Self {
            relational: Arc::new(RelationalBackend::new(pool.clone())),
            document: Arc::new(DocumentBackend::new(index.clone())),
            pool,
            index,
            query_timeout,
        }
    }

    /// Replaces the search backends, keeping the stores used for detail
    /// lookups and index maintenance.
    #[must_use]
    pub fn with_backends(
        mut self,
        relational: Arc<dyn SearchBackend>,
        document: Arc<dyn SearchBackend>,
    ) -> Self {
        self.relational = relational;
        self.document = document;
        self
    }

    fn backend(&self, which: Backend) -> &Arc<dyn SearchBackend> {
        match which {
            Backend::Relational => &self.relational,
            Backend::Document => &self.document,
        }
    }

    /// Runs one search against the chosen backend.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] if the backend fails or
    /// misses the deadline.
    pub async fn search(
        &self,
        params: &SearchParameters,
        backend: Backend,
    ) -> Result<SearchResponse, SearchError> {
        // Failures are logged once, by whoever maps them for the caller.
        let target = self.backend(backend);
        let resp =
            with_deadline(target.kind(), self.query_timeout, target.execute(params)).await?;

        tracing::debug!(
            %backend,
            total = resp.total,
            returned = resp.results.len(),
            "search complete"
        );
        Ok(resp)
    }

    /// Loads one salon with services, amenities and hours from Postgres.
    ///
    /// The three child reads run in sequence after the salon row, all under
    /// one deadline.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NotFound`] for an unknown id, or
    /// [`SearchError::BackendUnavailable`] on database failure or timeout.
    pub async fn get_by_id(&self, id: i64) -> Result<Salon, SearchError> {
        with_deadline(Backend::Relational, self.query_timeout, async {
            salonsearch_db::get_salon_by_id(&self.pool, id)
                .await
                .map_err(|e| match e {
                    DbError::NotFound => SearchError::NotFound(id),
                    other => SearchError::from_db(other),
                })
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] on database failure or timeout.
    pub async fn categories(&self) -> Result<Vec<Category>, SearchError> {
        with_deadline(Backend::Relational, self.query_timeout, async {
            salonsearch_db::list_categories(&self.pool)
                .await
                .map_err(SearchError::from_db)
        })
        .await
    }

    /// Rebuilds the secondary index from every active salon in Postgres.
    ///
    /// Not bounded by the query deadline; the index client's own request
    /// timeout applies to each call.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] naming whichever store failed.
    pub async fn reindex(&self) -> Result<usize, SearchError> {
        let salons = salonsearch_db::export_active_salons(&self.pool)
            .await
            .map_err(SearchError::from_db)?;
        let exported = salons.len();

        let indexed = self
            .index
            .bulk_replace(&salons)
            .await
            .map_err(SearchError::from_index)?;

        tracing::info!(exported, indexed, index = %self.index.index(), "reindex complete");
        Ok(indexed)
    }

    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] if the cluster cannot answer.
    pub async fn cluster_health(&self) -> Result<Value, SearchError> {
        with_deadline(Backend::Document, self.query_timeout, async {
            self.index
                .cluster_health()
                .await
                .map_err(SearchError::from_index)
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] if the cluster cannot answer.
    pub async fn index_stats(&self) -> Result<Value, SearchError> {
        with_deadline(Backend::Document, self.query_timeout, async {
            self.index
                .index_stats()
                .await
                .map_err(SearchError::from_index)
        })
        .await
    }

    /// Probes both stores concurrently. Never fails; unreachable stores are
    /// reported as `false`.
    pub async fn health(&self) -> HealthReport {
        let (pg, es) = tokio::join!(
            tokio::time::timeout(self.query_timeout, salonsearch_db::ping(&self.pool)),
            tokio::time::timeout(self.query_timeout, self.index.ping()),
        );

        let report = HealthReport {
            postgres: matches!(pg, Ok(Ok(()))),
            elasticsearch: matches!(es, Ok(Ok(()))),
        };
        if !report.is_healthy() {
            tracing::warn!(?report, "backend health degraded");
        }
        report
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
