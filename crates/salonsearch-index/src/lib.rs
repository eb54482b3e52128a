//! Elasticsearch side of salon search: index mapping, document shape, query
//! compilation and a thin `reqwest` client.

pub mod client;
pub mod document;
pub mod error;
pub mod mapping;
pub mod query;
pub mod types;

pub use client::IndexClient;
pub use document::{GeoLocation, SalonDocument, ServiceDocument};
pub use error::IndexError;
pub use query::{beyond_result_window, compile_query, MAX_RESULT_WINDOW};
pub use types::{SearchHit, SearchHits};
