use async_trait::async_trait;
use salonsearch_core::{SearchRequest, SearchResponse};
use sqlx::postgres::PgPoolOptions;

use super::*;

/// Answers with an empty page after `delay`.
struct StubBackend {
    kind: Backend,
    delay: Duration,
}

#[async_trait]
impl SearchBackend for StubBackend {
    fn kind(&self) -> Backend {
        self.kind
    }

    async fn execute(&self, params: &SearchParameters) -> Result<SearchResponse, SearchError> {
        tokio::time::sleep(self.delay).await;
        Ok(SearchResponse::new(Vec::new(), 0, params, self.kind))
    }
}

fn unreachable_service(timeout: Duration) -> SearchService {
    // Nothing listens on port 1; lazy pools do not connect until first use.
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://salonsearch@127.0.0.1:1/salonsearch")
        .expect("lazy pool");
    let index = IndexClient::new("http://127.0.0.1:1", "salons", 1).expect("index client");
    SearchService::new(pool, index, timeout)
}

fn stubbed(delay: Duration, timeout: Duration) -> SearchService {
    unreachable_service(timeout).with_backends(
        Arc::new(StubBackend {
            kind: Backend::Relational,
            delay,
        }),
        Arc::new(StubBackend {
            kind: Backend::Document,
            delay,
        }),
    )
}

fn params() -> SearchParameters {
    SearchParameters::try_from(SearchRequest::default()).expect("valid")
}

#[tokio::test]
async fn search_routes_to_the_selected_backend() {
    let service = stubbed(Duration::ZERO, Duration::from_secs(5));

    let relational = service
        .search(&params(), Backend::Relational)
        .await
        .expect("relational");
    let document = service
        .search(&params(), Backend::Document)
        .await
        .expect("document");

    assert_eq!(relational.source, Backend::Relational);
    assert_eq!(document.source, Backend::Document);
}

#[tokio::test]
async fn slow_backend_is_reported_unavailable() {
    let service = stubbed(Duration::from_secs(30), Duration::from_millis(50));

    let err = service
        .search(&params(), Backend::Document)
        .await
        .expect_err("should time out");

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
}

#[tokio::test]
async fn with_deadline_passes_inner_errors_through() {
    let result: Result<(), _> = with_deadline(Backend::Relational, Duration::from_secs(1), async {
        Err(SearchError::NotFound(9))
    })
    .await;
    assert!(matches!(result, Err(SearchError::NotFound(9))));
}

#[tokio::test]
async fn unreachable_database_is_backend_unavailable() {
    let service = unreachable_service(Duration::from_secs(2));

    let err = service.get_by_id(1).await.expect_err("should fail");
    assert!(
        matches!(
            err,
            SearchError::BackendUnavailable {
                backend: Backend::Relational,
                ..
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn health_reports_unreachable_stores() {
    let service = unreachable_service(Duration::from_millis(500));
    let report = service.health().await;
    assert_eq!(
        report,
        HealthReport {
            postgres: false,
            elasticsearch: false
        }
    );
    assert!(!report.is_healthy());
}
