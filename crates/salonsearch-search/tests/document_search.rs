//! End-to-end document-backend searches against a wiremock Elasticsearch.

use std::time::Duration;

use salonsearch_core::{Backend, SearchParameters, SearchRequest};
use salonsearch_index::IndexClient;
use salonsearch_search::{SearchError, SearchService};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(es_url: &str) -> SearchService {
    // The relational pool is never touched by these tests.
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://salonsearch@127.0.0.1:1/salonsearch")
        .expect("lazy pool");
    let index = IndexClient::new(es_url, "salons", 5).expect("index client");
    SearchService::new(pool, index, Duration::from_secs(5))
}

fn hit(id: i64, name: &str, rating: f64, score: f64) -> serde_json::Value {
    json!({
        "_index": "salons",
        "_id": id.to_string(),
        "_score": score,
        "_source": {
            "id": id,
            "name": name,
            "slug": name.to_lowercase().replace(' ', "-"),
            "city": "Mar del Plata",
            "location": { "lat": -38.0055, "lon": -57.5426 },
            "rating": rating,
            "review_count": 50,
            "price_range": 2,
            "is_active": true,
            "is_verified": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }
    })
}

#[tokio::test]
async fn mar_del_plata_verified_top_rated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/salons/_search"))
        .and(body_partial_json(json!({
            "from": 0,
            "size": 10,
            "query": {
                "bool": {
                    "filter": [
                        { "term": { "is_active": true } },
                        { "term": { "city": { "value": "Mar del Plata", "case_insensitive": true } } },
                        { "range": { "rating": { "gte": 4.5 } } },
                        { "term": { "is_verified": true } }
                    ]
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "total": { "value": 12, "relation": "eq" },
                "hits": [
                    hit(1, "Estilo Mar", 4.9, 1.0),
                    hit(2, "Onda Glam", 4.6, 1.0)
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = SearchParameters::try_from(SearchRequest {
        city: Some("Mar del Plata".to_string()),
        min_rating: Some(4.5),
        verified: Some(true),
        page: Some(1),
        page_size: Some(10),
        ..SearchRequest::default()
    })
    .expect("valid");

    let resp = service(&server.uri())
        .search(&params, Backend::Document)
        .await
        .expect("search should succeed");

    assert_eq!(resp.source, Backend::Document);
    assert_eq!(resp.total, 12);
    assert_eq!(resp.page, 1);
    assert_eq!(resp.page_size, 10);
    assert_eq!(resp.total_pages, 2);
    assert!(resp.results.len() <= 10);
    for r in &resp.results {
        assert!(r.salon.is_active && r.salon.is_verified);
        assert!(r.salon.rating.unwrap_or(0.0) >= 4.5);
        assert_eq!(r.salon.location.city.as_deref(), Some("Mar del Plata"));
        assert_eq!(r.score, Some(1.0));
        assert_eq!(r.distance_km, None);
    }

    let json = serde_json::to_value(&resp).expect("serialize");
    let keys: Vec<&str> = json
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    for key in ["results", "total", "page", "page_size", "total_pages", "query", "source"] {
        assert!(keys.contains(&key), "missing {key}");
    }
    assert_eq!(json["source"], "elasticsearch");
    assert!(json["results"][0].get("highlights").is_none());
}

#[tokio::test]
async fn engine_outage_is_backend_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/salons/_search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("cluster_block_exception"))
        .mount(&server)
        .await;

    let err = service(&server.uri())
        .search(
            &SearchParameters::try_from(SearchRequest::default()).expect("valid"),
            Backend::Document,
        )
        .await
        .expect_err("should fail");

    assert!(
        matches!(
            err,
            SearchError::BackendUnavailable {
                backend: Backend::Document,
                ..
            }
        ),
        "got {err:?}"
    );
    assert_eq!(err.code(), "backend_unavailable");
}

#[tokio::test]
async fn cluster_admin_calls_pass_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_cluster/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "yellow" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/salons/_stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_all": {} })))
        .mount(&server)
        .await;

    let svc = service(&server.uri());
    assert_eq!(svc.cluster_health().await.expect("health")["status"], "yellow");
    assert!(svc.index_stats().await.expect("stats")["_all"].is_object());
}

#[tokio::test]
async fn page_past_result_window_reports_total_without_hits() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/salons/_search"))
        .and(body_partial_json(json!({ "size": 0, "track_total_hits": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "total": { "value": 12, "relation": "eq" },
                "hits": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = SearchParameters::try_from(SearchRequest {
        page: Some(1001),
        page_size: Some(10),
        ..SearchRequest::default()
    })
    .expect("valid");

    let resp = service(&server.uri())
        .search(&params, Backend::Document)
        .await
        .expect("search should succeed");

    assert!(resp.results.is_empty());
    assert_eq!(resp.total, 12);
    assert_eq!(resp.page, 1001);
    assert_eq!(resp.total_pages, 2);
}

#[tokio::test]
async fn text_search_sorted_by_rating_keeps_engine_score() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/salons/_search"))
        .and(body_partial_json(json!({ "track_scores": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "hits": [hit(1, "Estilo Mar", 4.9, 3.25)]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = SearchParameters::try_from(SearchRequest {
        q: Some("corte".to_string()),
        sort: Some("rating".to_string()),
        ..SearchRequest::default()
    })
    .expect("valid");

    let resp = service(&server.uri())
        .search(&params, Backend::Document)
        .await
        .expect("search should succeed");

    assert_eq!(resp.results[0].score, Some(3.25));
}
