use thiserror::Error;

/// Errors returned by the Elasticsearch client.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine answered with a non-success status.
    #[error("Elasticsearch returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid Elasticsearch URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl IndexError {
    /// True for a 404 from the engine, e.g. a missing index.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, IndexError::Api { status: 404, .. })
    }
}
