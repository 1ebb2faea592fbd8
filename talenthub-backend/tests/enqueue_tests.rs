mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use talenthub_config::Config;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

fn enqueue_request(token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = post_json("/api/jobs");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn with_api_token(mut cfg: Config) -> Config {
    cfg.api.token = Some(API_TOKEN.to_string());
    cfg
}

/// Production config publishing to `server`.
fn provider_config(server: &MockServer) -> Config {
    let mut cfg = with_api_token(production_config());
    cfg.queue.token = Some("queue-token".into());
    cfg.queue.publish_url = format!("{}/v1/publish", server.uri());
    cfg.queue.callback_base_url = Some("https://talenthub.example.com".into());
    cfg
}

#[tokio::test]
async fn enqueue_is_forbidden_without_api_token() {
    let router = router_for(&development_config());

    let (status, json) = send(
        &router,
        enqueue_request(Some("anything"), r#"{"jobType":"processEmail"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "forbidden: enqueue API is disabled");
}

#[tokio::test]
async fn enqueue_rejects_bad_credentials() {
    let router = router_for(&with_api_token(development_config()));

    for token in [None, Some("wrong-token")] {
        let (status, _) = send(
            &router,
            enqueue_request(token, r#"{"jobType":"processEmail"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn development_enqueue_is_simulated() {
    let router = router_for(&with_api_token(development_config()));

    let (status, json) = send(
        &router,
        enqueue_request(
            Some(API_TOKEN),
            r#"{"jobType":"processEmail","payload":{"to":"a@b.com"},"delaySeconds":30}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["jobType"], "processEmail");
    assert_eq!(json["simulated"], true);
    assert!(json["messageId"].as_str().unwrap().starts_with("sim-"));
}

#[tokio::test]
async fn unknown_job_type_is_a_bad_request() {
    let router = router_for(&with_api_token(development_config()));

    let (status, json) = send(
        &router,
        enqueue_request(Some(API_TOKEN), r#"{"jobType":"mineBitcoin"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Unknown job type: mineBitcoin"));
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let router = router_for(&with_api_token(development_config()));

    let (status, json) = send(&router, enqueue_request(Some(API_TOKEN), "[1, 2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("bad request: invalid request body"));

    let (status, _) = send(
        &router,
        enqueue_request(
            Some(API_TOKEN),
            r#"{"jobType":"syncData","scheduledAt":"next tuesday"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn production_without_queue_token_is_unavailable() {
    let router = router_for(&with_api_token(production_config()));

    let (status, json) = send(
        &router,
        enqueue_request(Some(API_TOKEN), r#"{"jobType":"processEmail"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["retryable"], false);
}

#[tokio::test]
async fn enqueue_publishes_to_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/publish"))
        .and(query_param(
            "url",
            "https://talenthub.example.com/api/job-runner",
        ))
        .and(header("authorization", "Bearer queue-token"))
        .and(header("x-deduplication-id", "welcome-42"))
        .and(body_json(json!({
            "jobType": "processEmail",
            "payload": {"to": "a@b.com"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messageId": "msg_abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let router = router_for(&provider_config(&server));
    let (status, json) = send(
        &router,
        enqueue_request(
            Some(API_TOKEN),
            r#"{"jobType":"processEmail","payload":{"to":"a@b.com"},"deduplicationId":"welcome-42"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(
        json,
        json!({"jobType": "processEmail", "messageId": "msg_abc", "simulated": false})
    );
}

#[tokio::test]
async fn scheduled_at_in_the_past_runs_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/publish"))
        .and(header("x-delay", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messageId": "msg_now"})))
        .expect(1)
        .mount(&server)
        .await;

    let router = router_for(&provider_config(&server));
    let (status, json) = send(
        &router,
        enqueue_request(
            Some(API_TOKEN),
            r#"{"jobType":"generateReport","delaySeconds":600,"scheduledAt":"2020-01-01T00:00:00Z"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["messageId"], "msg_now");
}

#[tokio::test]
async fn provider_failure_is_a_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/publish"))
        .respond_with(ResponseTemplate::new(500).set_body_string("provider down"))
        .mount(&server)
        .await;

    let router = router_for(&provider_config(&server));
    let (status, json) = send(
        &router,
        enqueue_request(Some(API_TOKEN), r#"{"jobType":"syncData"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["retryable"], true);
    assert!(json["error"].as_str().unwrap().contains("provider down"));
}
