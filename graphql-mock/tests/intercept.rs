//! End-to-end tests over the interceptor service with a stub inner client.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::task::Poll;
use std::time::Duration;

use bytes::Bytes;
use futures::future;
use graphql_mock::Configuration;
use graphql_mock::MockHarness;
use graphql_mock::MockTable;
use graphql_mock::OperationMock;
use graphql_mock::OperationTable;
use graphql_mock::SessionOverrides;
use graphql_mock::graphql;
use http::StatusCode;
use serde_json_bytes::json;
use tower::BoxError;
use tower::Service;
use tower::ServiceExt;

/// Counts the requests that reach the real network.
#[derive(Clone, Default)]
struct Passthrough {
    hits: Arc<AtomicUsize>,
}

impl Service<http::Request<Bytes>> for Passthrough {
    type Response = http::Response<Bytes>;
    type Error = BoxError;
    type Future = future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: http::Request<Bytes>) -> Self::Future {
        self.hits.fetch_add(1, Ordering::SeqCst);
        future::ok(
            http::Response::builder()
                .status(StatusCode::BAD_GATEWAY)
                .body(Bytes::from_static(b"passed through"))
                .expect("response is valid; qed"),
        )
    }
}

fn post(url: &str, body: serde_json::Value) -> http::Request<Bytes> {
    http::Request::builder()
        .method(http::Method::POST)
        .uri(url)
        .body(Bytes::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn response_json(response: &http::Response<Bytes>) -> serde_json::Value {
    serde_json::from_slice(response.body()).expect("mocked response is JSON")
}

#[test_log::test(tokio::test)]
async fn configured_operations_are_mocked() {
    let harness = MockHarness::new();
    harness
        .mock_graphql(
            Configuration::builder()
                .schema("type Query { pong: Boolean }")
                .operations(OperationTable::new().with_operation(
                    "Ping",
                    OperationMock::handler(|_| Ok(json!({"pong": true}))),
                ))
                .build(),
        )
        .unwrap();

    let inner = Passthrough::default();
    let response = harness
        .intercept(inner.clone())
        .oneshot(post(
            "https://app.example/graphql",
            serde_json::json!({
                "operationName": "Ping",
                "query": "query Ping { pong }",
                "variables": {},
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[http::header::CONTENT_TYPE],
        "application/json",
    );
    assert_eq!(
        response_json(&response),
        serde_json::json!({"data": {"pong": true}}),
    );
    // the request never reached the network
    assert_eq!(inner.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn a_failing_handler_becomes_the_response_errors() {
    let harness = MockHarness::new();
    harness
        .mock_graphql(
            Configuration::builder()
                .schema("type Query { pong: Boolean }")
                .operations(OperationTable::new().with_operation(
                    "Fails",
                    OperationMock::handler(|_| {
                        Err(graphql::Error::builder().message("boom").build())
                    }),
                ))
                .build(),
        )
        .unwrap();

    let response = harness
        .intercept(Passthrough::default())
        .oneshot(post(
            "https://app.example/graphql",
            serde_json::json!({
                "operationName": "Fails",
                "query": "query Fails { pong }",
                "variables": {},
            }),
        ))
        .await
        .unwrap();

    let body = String::from_utf8(response.body().to_vec()).unwrap();
    insta::assert_snapshot!(body, @r#"{"data":{},"errors":[{"message":"boom"}]}"#);
}

#[tokio::test]
async fn handlers_receive_the_request_variables() {
    let harness = MockHarness::new();
    harness
        .mock_graphql(
            Configuration::builder()
                .schema("type Query { echo: String }")
                .operations(OperationTable::new().with_operation(
                    "Echo",
                    OperationMock::handler(|variables| {
                        Ok(json!({"echo": variables.get("word").cloned()}))
                    }),
                ))
                .build(),
        )
        .unwrap();

    let response = harness
        .intercept(Passthrough::default())
        .oneshot(post(
            "https://app.example/graphql",
            serde_json::json!({
                "operationName": "Echo",
                "query": "query Echo { echo }",
                "variables": {"word": "hi"},
            }),
        ))
        .await
        .unwrap();

    assert_eq!(
        response_json(&response),
        serde_json::json!({"data": {"echo": "hi"}}),
    );
}

#[tokio::test]
async fn layered_overrides_resolve_with_the_last_one_winning() {
    let harness = MockHarness::new();
    harness
        .mock_graphql(
            Configuration::builder()
                .schema("type Query { me: User } type User { name: String }")
                .build(),
        )
        .unwrap();

    for name in ["A", "B"] {
        harness
            .mock_graphql_ops(
                None,
                SessionOverrides::builder()
                    .mocks(MockTable::new().with_mock("User", json!({"name": name})))
                    .build(),
            )
            .unwrap();
    }

    let response = harness
        .intercept(Passthrough::default())
        .oneshot(post(
            "https://app.example/graphql",
            serde_json::json!({
                "operationName": "Me",
                "query": "query Me { me { name } }",
                "variables": {},
            }),
        ))
        .await
        .unwrap();

    assert_eq!(
        response_json(&response),
        serde_json::json!({"data": {"me": {"name": "B"}}}),
    );
}

#[tokio::test]
async fn non_matching_requests_pass_through() {
    let harness = MockHarness::new();
    harness
        .mock_graphql(
            Configuration::builder()
                .schema("type Query { pong: Boolean }")
                .build(),
        )
        .unwrap();
    let inner = Passthrough::default();

    // wrong URL
    let response = harness
        .intercept(inner.clone())
        .oneshot(post("https://app.example/rest", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // wrong method
    let get = http::Request::builder()
        .method(http::Method::GET)
        .uri("https://app.example/graphql")
        .body(Bytes::new())
        .unwrap();
    let response = harness.intercept(inner.clone()).oneshot(get).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    assert_eq!(inner.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn a_malformed_body_fails_the_calling_test() {
    let harness = MockHarness::new();
    harness
        .mock_graphql(
            Configuration::builder()
                .schema("type Query { pong: Boolean }")
                .build(),
        )
        .unwrap();

    let request = http::Request::builder()
        .method(http::Method::POST)
        .uri("https://app.example/graphql")
        .body(Bytes::from_static(b"not json"))
        .unwrap();
    let result = harness
        .intercept(Passthrough::default())
        .oneshot(request)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn the_configured_delay_elapses_before_responding() {
    let harness = MockHarness::new();
    harness
        .mock_graphql(
            Configuration::builder()
                .schema("type Query { pong: Boolean }")
                .delay(Duration::from_millis(50))
                .operations(OperationTable::new().with_operation(
                    "Fails",
                    OperationMock::handler(|_| {
                        Err(graphql::Error::builder().message("boom").build())
                    }),
                ))
                .build(),
        )
        .unwrap();

    let start = tokio::time::Instant::now();
    let response = harness
        .intercept(Passthrough::default())
        .oneshot(post(
            "https://app.example/graphql",
            serde_json::json!({
                "operationName": "Fails",
                "query": "query Fails { pong }",
                "variables": {},
            }),
        ))
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert_eq!(
        response_json(&response),
        serde_json::json!({"data": {}, "errors": [{"message": "boom"}]}),
    );
}

#[tokio::test]
async fn distinct_endpoints_give_independent_sessions() {
    let harness = MockHarness::new();
    harness
        .mock_graphql(
            Configuration::builder()
                .endpoint("/users/graphql")
                .schema("type Query { name: String }")
                .mocks(MockTable::new().with_mock("Query", json!({"name": "users"})))
                .build(),
        )
        .unwrap();
    harness
        .mock_graphql(
            Configuration::builder()
                .endpoint("/orders/graphql")
                .schema("type Query { name: String }")
                .mocks(MockTable::new().with_mock("Query", json!({"name": "orders"})))
                .build(),
        )
        .unwrap();

    for (endpoint, expected) in [("users", "users"), ("orders", "orders")] {
        let response = harness
            .intercept(Passthrough::default())
            .oneshot(post(
                &format!("https://app.example/{endpoint}/graphql"),
                serde_json::json!({
                    "operationName": "Name",
                    "query": "query Name { name }",
                    "variables": {},
                }),
            ))
            .await
            .unwrap();
        assert_eq!(
            response_json(&response),
            serde_json::json!({"data": {"name": expected}}),
        );
    }
}
