//! The search capability and its two implementations.
//!
//! Callers pick a backend with the [`Backend`] enum; both variants answer the
//! same [`SearchParameters`] with the same [`SearchResponse`] envelope.

use async_trait::async_trait;
use salonsearch_core::{Backend, SearchParameters, SearchResponse};
use salonsearch_index::{compile_query, IndexClient};
use sqlx::PgPool;

use crate::error::SearchError;
use crate::normalize;

/// Something that can execute a search.
///
/// Implementations issue exactly one round trip to their store per call and
/// never retry.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Which store this backend reads.
    fn kind(&self) -> Backend;

    /// Compile, execute and normalize one search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::BackendUnavailable`] when the store cannot
    /// answer and [`SearchError::QueryCompilation`] when it rejects the
    /// compiled query.
    async fn execute(&self, params: &SearchParameters) -> Result<SearchResponse, SearchError>;
}

/// Postgres full-text search over the source-of-truth tables.
#[derive(Debug, Clone)]
pub struct RelationalBackend {
    pool: PgPool,
}

impl RelationalBackend {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchBackend for RelationalBackend {
    fn kind(&self) -> Backend {
        Backend::Relational
    }

    async fn execute(&self, params: &SearchParameters) -> Result<SearchResponse, SearchError> {
        let page = salonsearch_db::search_salons(&self.pool, params)
            .await
            .map_err(SearchError::from_db)?;
        Ok(normalize::from_relational(page, params))
    }
}

/// Elasticsearch search over the secondary index.
#[derive(Debug, Clone)]
pub struct DocumentBackend {
    client: IndexClient,
}

impl DocumentBackend {
    #[must_use]
    pub fn new(client: IndexClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchBackend for DocumentBackend {
    fn kind(&self) -> Backend {
        Backend::Document
    }

    async fn execute(&self, params: &SearchParameters) -> Result<SearchResponse, SearchError> {
        let query = compile_query(params);
        tracing::debug!(index = %self.client.index(), %query, "document search");
        let hits = self
            .client
            .search(&query)
            .await
            .map_err(SearchError::from_index)?;
        Ok(normalize::from_document(hits, params))
    }
}
