//! Compiles [`SearchParameters`] into an Elasticsearch `_search` body.
//!
//! Free text is the only scoring clause. Every other criterion is a
//! non-scoring `filter`, so the engine's score reflects text relevance alone.

use salonsearch_core::{SearchParameters, SortBy};
use serde_json::{json, Value};

/// Fields searched by the free-text query, `name` boosted.
pub const TEXT_FIELDS: [&str; 2] = ["name^3", "description"];

/// Engine default for `index.max_result_window`; `from + size` above it is
/// rejected with a 400.
pub const MAX_RESULT_WINDOW: u64 = 10_000;

/// Nested path holding service names.
const SERVICES_PATH: &str = "services";

fn text_query(q: &str) -> Value {
    json!({
        "bool": {
            "should": [
                {
                    "multi_match": {
                        "query": q,
                        "fields": TEXT_FIELDS,
                        "fuzziness": "AUTO"
                    }
                },
                {
                    "nested": {
                        "path": SERVICES_PATH,
                        "query": {
                            "match": {
                                "services.name": { "query": q, "fuzziness": "AUTO" }
                            }
                        },
                        "score_mode": "max"
                    }
                }
            ],
            "minimum_should_match": 1
        }
    })
}

fn filters(params: &SearchParameters) -> Vec<Value> {
    let mut filter = vec![json!({ "term": { "is_active": true } })];

    if let Some(city) = params.city() {
        filter.push(json!({
            "term": { "city": { "value": city, "case_insensitive": true } }
        }));
    }
    if let Some(category_id) = params.category_id() {
        filter.push(json!({ "term": { "category_id": category_id } }));
    }
    if let Some(tier) = params.price_tier() {
        filter.push(json!({ "term": { "price_range": tier.0 } }));
    }
    if let Some(min_rating) = params.min_rating() {
        filter.push(json!({ "range": { "rating": { "gte": min_rating } } }));
    }
    if params.verified_only() {
        filter.push(json!({ "term": { "is_verified": true } }));
    }
    if let Some((center, radius_km)) = params.geo_radius() {
        filter.push(json!({
            "geo_distance": {
                "distance": format!("{radius_km}km"),
                "location": { "lat": center.latitude, "lon": center.longitude }
            }
        }));
    }

    filter
}

fn sort(params: &SearchParameters) -> Vec<Value> {
    let mut sort = match (params.effective_sort(), params.center()) {
        (SortBy::Relevance, _) => vec![
            json!({ "_score": { "order": "desc" } }),
            json!({ "rating": { "order": "desc", "missing": "_last" } }),
        ],
        (SortBy::Distance, Some(center)) => vec![json!({
            "_geo_distance": {
                "location": { "lat": center.latitude, "lon": center.longitude },
                "order": "asc",
                "unit": "km",
                "distance_type": "arc",
                "ignore_unmapped": true
            }
        })],
        (SortBy::Reviews, _) => vec![
            json!({ "review_count": { "order": "desc" } }),
            json!({ "rating": { "order": "desc", "missing": "_last" } }),
        ],
        (SortBy::Newest, _) => vec![json!({ "created_at": { "order": "desc" } })],
        // Rating, and distance without a center.
        (SortBy::Rating | SortBy::Distance, _) => vec![
            json!({ "rating": { "order": "desc", "missing": "_last" } }),
            json!({ "review_count": { "order": "desc" } }),
        ],
    };
    sort.push(json!({ "id": { "order": "asc" } }));
    sort
}

/// Whether the requested page lies beyond [`MAX_RESULT_WINDOW`].
#[must_use]
pub fn beyond_result_window(params: &SearchParameters) -> bool {
    params.offset() + u64::from(params.page_size()) > MAX_RESULT_WINDOW
}

/// Builds the request body for `POST /<index>/_search`.
///
/// `track_total_hits` is always on so `hits.total.value` is exact rather
/// than capped at the engine's default of 10 000. A page past the result
/// window compiles to a count-only body (`size: 0`), which answers with the
/// total and no hits, the same as a relational page past the end.
#[must_use]
pub fn compile_query(params: &SearchParameters) -> Value {
    let must = match params.query() {
        Some(q) => vec![text_query(q)],
        None => vec![json!({ "match_all": {} })],
    };

    if beyond_result_window(params) {
        return json!({
            "query": {
                "bool": {
                    "must": must,
                    "filter": filters(params)
                }
            },
            "size": 0,
            "track_total_hits": true
        });
    }

    let from = params.offset();
    let mut body = json!({
        "query": {
            "bool": {
                "must": must,
                "filter": filters(params)
            }
        },
        "sort": sort(params),
        "from": from,
        "size": params.page_size(),
        "track_total_hits": true
    });

    if params.query().is_some() {
        // Field sorts drop `_score` unless asked to keep it.
        body["track_scores"] = json!(true);
        body["highlight"] = json!({
            "fields": {
                "name": {},
                "description": {}
            }
        });
    }

    body
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
