//! Backend-agnostic salon search.
//!
//! [`SearchService`] is the single entry point: it picks a [`SearchBackend`]
//! by [`salonsearch_core::Backend`], bounds every store call with a deadline,
//! and maps store failures onto [`SearchError`].

pub mod backend;
pub mod error;
pub mod normalize;
pub mod service;

pub use backend::{DocumentBackend, RelationalBackend, SearchBackend};
pub use error::SearchError;
pub use service::{with_deadline, HealthReport, SearchService};
