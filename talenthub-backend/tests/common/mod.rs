#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use talenthub_backend::build_router;
use talenthub_backend::state::AppState;
use talenthub_config::{Config, Environment};
use talenthub_job_queue::JobRunner;
use tower::util::ServiceExt;

pub const CURRENT_KEY: &str = "sig_current_test_key";
pub const NEXT_KEY: &str = "sig_next_test_key";
pub const API_TOKEN: &str = "internal-api-token";

/// Production config with a full signing key pair.
pub fn production_config() -> Config {
    let mut cfg = Config::default();
    cfg.environment = Environment::Production;
    cfg.signing.current_key = Some(CURRENT_KEY.to_string());
    cfg.signing.next_key = Some(NEXT_KEY.to_string());
    cfg
}

/// Development config with no secrets at all.
pub fn development_config() -> Config {
    let mut cfg = Config::default();
    cfg.environment = Environment::Development;
    cfg
}

pub fn router_for(cfg: &Config) -> Router {
    let runner = talenthub_jobs::build_runner().expect("runner");
    router_with_runner(cfg, runner)
}

pub fn router_with_runner(cfg: &Config, runner: JobRunner) -> Router {
    let state = AppState::from_config(cfg, runner).expect("state");
    build_router(Arc::new(state))
}

/// Signature header for `body` signed now.
pub fn sign_now(key: &str, body: &str) -> String {
    talenthub_auth::sign_header(key, chrono::Utc::now().timestamp(), body.as_bytes())
}

/// Send a request and decode the body as JSON (`Null` when it is not JSON).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub fn post_json(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
}
