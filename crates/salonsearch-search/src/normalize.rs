//! Turns raw backend output into the shared [`SearchResponse`] envelope.

use salonsearch_core::{Backend, SearchParameters, SearchResponse, SearchResult};
use salonsearch_db::SalonPage;
use salonsearch_index::SearchHits;

/// Relational results carry no score. Distance is only surfaced when the
/// query sorted by it, since only then did the database compute it.
#[must_use]
pub fn from_relational(page: SalonPage, params: &SearchParameters) -> SearchResponse {
    let with_distance = params.sorts_by_distance();
    let results = page
        .hits
        .into_iter()
        .map(|hit| SearchResult {
            salon: hit.salon,
            score: None,
            distance_km: hit.distance_km.filter(|_| with_distance),
            highlights: None,
        })
        .collect();

    SearchResponse::new(results, page.total, params, Backend::Relational)
}

/// Document results carry the engine score verbatim. Distance is computed
/// from each hit's stored location whenever a center was supplied.
#[must_use]
pub fn from_document(hits: SearchHits, params: &SearchParameters) -> SearchResponse {
    let center = params.center();
    let results = hits
        .hits
        .into_iter()
        .map(|hit| {
            let highlights = hit.fragments();
            let salon = hit.source.into_salon();
            let distance_km = center.and_then(|c| salon.distance_to(&c));
            SearchResult {
                salon,
                score: hit.score,
                distance_km,
                highlights,
            }
        })
        .collect();

    SearchResponse::new(results, hits.total.value, params, Backend::Document)
}
