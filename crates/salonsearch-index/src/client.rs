//! HTTP client for the Elasticsearch REST API.
//!
//! Wraps `reqwest` with index-scoped URLs and uniform error handling: any
//! non-2xx answer becomes [`IndexError::Api`] carrying the status and body.

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use salonsearch_core::Salon;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::document::SalonDocument;
use crate::error::IndexError;
use crate::mapping::index_definition;
use crate::types::{SearchEnvelope, SearchHits};

/// Client bound to one Elasticsearch cluster and one index.
#[derive(Debug, Clone)]
pub struct IndexClient {
    client: Client,
    base_url: Url,
    index: String,
}

impl IndexClient {
    /// Creates a client for `index` on the cluster at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`IndexError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn new(base_url: &str, index: &str, timeout_secs: u64) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("salonsearch/0.1")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| IndexError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            index: index.to_string(),
        })
    }

    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    fn url(&self, path: &str) -> Result<Url, IndexError> {
        self.base_url
            .join(path)
            .map_err(|e| IndexError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, IndexError> {
        Ok(self.client.request(method, self.url(path)?))
    }

    /// Sends the request and turns any non-2xx status into [`IndexError::Api`].
    async fn send(builder: RequestBuilder) -> Result<Response, IndexError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IndexError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn json<T: DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, IndexError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| IndexError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Runs a compiled query against the index.
    ///
    /// # Errors
    ///
    /// - [`IndexError::Http`] on network failure or timeout.
    /// - [`IndexError::Api`] if the engine rejects the query or the index is missing.
    /// - [`IndexError::Deserialize`] if the hits do not match [`SalonDocument`].
    pub async fn search(&self, query: &Value) -> Result<SearchHits, IndexError> {
        let path = format!("{}/_search", self.index);
        let response = Self::send(self.request(Method::POST, &path)?.json(query)).await?;
        let envelope: SearchEnvelope = Self::json(response, &path).await?;
        Ok(envelope.hits)
    }

    /// Whether the index exists.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] on network failure or an unexpected status.
    pub async fn index_exists(&self) -> Result<bool, IndexError> {
        match Self::send(self.request(Method::HEAD, &self.index)?).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Creates the index with the salon mapping unless it already exists.
    ///
    /// Returns `true` if the index was created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if the existence check or creation fails.
    pub async fn ensure_index(&self) -> Result<bool, IndexError> {
        if self.index_exists().await? {
            tracing::debug!(index = %self.index, "index already exists");
            return Ok(false);
        }
        self.create_index().await?;
        Ok(true)
    }

    async fn create_index(&self) -> Result<(), IndexError> {
        Self::send(
            self.request(Method::PUT, &self.index)?
                .json(&index_definition()),
        )
        .await?;
        tracing::info!(index = %self.index, "created index");
        Ok(())
    }

    /// Deletes the index. A missing index is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] on network failure or any status other than 404.
    pub async fn delete_index(&self) -> Result<(), IndexError> {
        match Self::send(self.request(Method::DELETE, &self.index)?).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Replaces the whole index with `salons`: delete, recreate with the
    /// mapping, then bulk-index every document with `refresh=true`.
    ///
    /// Returns the number of documents indexed.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if any step fails, including per-item bulk
    /// failures reported in a 200 response.
    pub async fn bulk_replace(&self, salons: &[Salon]) -> Result<usize, IndexError> {
        self.delete_index().await?;
        self.create_index().await?;

        if salons.is_empty() {
            return Ok(0);
        }

        let body = bulk_body(&self.index, salons)?;
        let response = Self::send(
            self.request(Method::POST, "_bulk?refresh=true")?
                .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
                .body(body),
        )
        .await?;

        let result: Value = Self::json(response, "_bulk").await?;
        if result.get("errors").and_then(Value::as_bool) == Some(true) {
            let first = first_bulk_error(&result).unwrap_or_else(|| "unknown".to_string());
            return Err(IndexError::Api {
                status: 200,
                body: format!("bulk indexing reported item errors; first: {first}"),
            });
        }

        tracing::info!(index = %self.index, count = salons.len(), "bulk indexed salons");
        Ok(salons.len())
    }

    /// `GET /_cluster/health`, passed through verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] on network failure or a non-2xx status.
    pub async fn cluster_health(&self) -> Result<Value, IndexError> {
        let response = Self::send(self.request(Method::GET, "_cluster/health")?).await?;
        Self::json(response, "_cluster/health").await
    }

    /// `GET /<index>/_stats`, passed through verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] on network failure or a non-2xx status.
    pub async fn index_stats(&self) -> Result<Value, IndexError> {
        let path = format!("{}/_stats", self.index);
        let response = Self::send(self.request(Method::GET, &path)?).await?;
        Self::json(response, &path).await
    }

    /// Cheap liveness probe against the cluster root.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if the cluster is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), IndexError> {
        Self::send(self.request(Method::GET, "")?).await?;
        Ok(())
    }
}

/// NDJSON body for `_bulk`: one action line and one source line per salon.
fn bulk_body(index: &str, salons: &[Salon]) -> Result<String, IndexError> {
    let mut body = String::new();
    for salon in salons {
        let action = json!({ "index": { "_index": index, "_id": salon.id.to_string() } });
        let doc = serde_json::to_string(&SalonDocument::from(salon)).map_err(|e| {
            IndexError::Deserialize {
                context: format!("serialize salon {}", salon.id),
                source: e,
            }
        })?;
        // Writing to a String cannot fail.
        let _ = writeln!(body, "{action}");
        let _ = writeln!(body, "{doc}");
    }
    Ok(body)
}

fn first_bulk_error(result: &Value) -> Option<String> {
    result
        .get("items")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("index"))
        .find_map(|op| op.get("error"))
        .map(Value::to_string)
}
