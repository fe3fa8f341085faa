use std::sync::Arc;
use std::time::Duration;

use supplier_feed::test_support::InMemoryCatalog;
use supplier_feed::{FeedFetcher, FetchError, SupplierSync};
use supplier_feed_http::{EndpointClient, RetryPolicy};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_client() -> EndpointClient {
    EndpointClient::new().with_policy(RetryPolicy {
        max_attempts: 3,
        delay: Duration::from_millis(10),
    })
}

fn feed_url(server: &MockServer) -> String {
    format!("{}/feed", server.uri())
}

#[tokio::test]
async fn fetch_returns_body_and_sends_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(header("Accept", "application/json"))
        .and(header("Authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"products":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let body = quick_client()
        .fetch(&feed_url(&server), Some("s3cret"))
        .await
        .unwrap();
    assert_eq!(body.bytes, br#"{"products":[]}"#);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = quick_client().fetch(&feed_url(&server), None).await;
    assert!(matches!(result, Err(FetchError::Status { status: 404 })));
}

#[tokio::test]
async fn server_errors_exhaust_retry_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let result = quick_client().fetch(&feed_url(&server), None).await;
    assert!(matches!(result, Err(FetchError::Status { status: 503 })));
}

#[tokio::test]
async fn transient_failure_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"products":[{"sku":"A"}]}"#))
        .mount(&server)
        .await;

    let body = quick_client().fetch(&feed_url(&server), None).await.unwrap();
    assert!(String::from_utf8(body.bytes).unwrap().contains("\"sku\""));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = EndpointClient::new()
        .with_policy(RetryPolicy::none())
        .with_timeout(Duration::from_millis(50));

    let result = client.fetch(&feed_url(&server), None).await;
    assert!(matches!(result, Err(FetchError::Network(_))));
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let result = quick_client().fetch("http://127.0.0.1:1/feed", None).await;
    assert!(matches!(result, Err(FetchError::Network(_))));
}

#[tokio::test]
async fn endpoint_sync_end_to_end() {
    let server = MockServer::start().await;
    let mut body = b"\xEF\xBB\xBF".to_vec();
    body.extend_from_slice(
        br#"{"products":[
            {"sku":"E-1","name":"Engine","price":1200,"currency":"eur","stock":2,"incoming_stock":1},
            {"sku":"E-1","name":"Engine","stock":1,"incoming_stock":5},
            {"name":"No sku"}
        ]}"#,
    );

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let catalog = Arc::new(InMemoryCatalog::new());
    let sync = SupplierSync::new(catalog.clone(), Arc::new(quick_client()));

    let result = sync.sync_from_endpoint(&feed_url(&server), None).await;
    assert_eq!(result.total, 3);
    assert_eq!(result.inserted, 1);
    assert_eq!(result.updated, 0);
    assert_eq!(result.errors, vec!["Row 3: Missing required field: sku"]);

    let engine = catalog.get("E-1").unwrap();
    assert_eq!(engine.price, Some(1200.0));
    assert_eq!(engine.currency, "EUR");
    assert_eq!(engine.stock, 1);
    assert_eq!(engine.incoming_stock, 6);
}

#[tokio::test]
async fn endpoint_sync_reports_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let catalog = Arc::new(InMemoryCatalog::new());
    let sync = SupplierSync::new(catalog.clone(), Arc::new(quick_client()));

    let result = sync.sync_from_endpoint(&feed_url(&server), Some("bad")).await;
    assert_eq!(result.errors, vec!["API returned non-200: 401"]);
    assert_eq!(result.total, 0);
    assert_eq!(catalog.upsert_calls(), 0);
}
