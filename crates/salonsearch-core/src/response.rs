//! The backend-independent result envelope.

use std::str::FromStr;

use serde::Serialize;

use crate::params::SearchParameters;
use crate::salon::Salon;

/// Which storage engine answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Backend {
    #[serde(rename = "postgresql")]
    Relational,
    #[serde(rename = "elasticsearch")]
    Document,
}

impl Backend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Relational => "postgresql",
            Backend::Document => "elasticsearch",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relational" | "postgres" | "postgresql" | "pg" => Ok(Backend::Relational),
            "document" | "elasticsearch" | "es" => Ok(Backend::Document),
            other => Err(format!(
                "unknown backend '{other}'; expected postgres or elasticsearch"
            )),
        }
    }
}

/// One matched salon plus backend-specific annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub salon: Salon,
    /// Engine relevance score. Only the document backend produces one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
}

impl SearchResult {
    #[must_use]
    pub fn plain(salon: Salon) -> Self {
        Self {
            salon,
            score: None,
            distance_km: None,
            highlights: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Matches across all pages, not just this one.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    /// Echo of the text query, empty when none was given.
    pub query: String,
    pub source: Backend,
}

impl SearchResponse {
    #[must_use]
    pub fn new(
        results: Vec<SearchResult>,
        total: u64,
        params: &SearchParameters,
        source: Backend,
    ) -> Self {
        Self {
            results,
            total,
            page: params.page(),
            page_size: params.page_size(),
            total_pages: total_pages(total, params.page_size()),
            query: params.query().unwrap_or_default().to_string(),
            source,
        }
    }
}

/// `ceil(total / page_size)`; a zero page size counts as one.
#[must_use]
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    total.div_ceil(u64::from(page_size.max(1)))
}
