//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::types::{BackoffType, QueryParams};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retries(server: &MockServer, max_retries: u32) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(max_retries)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .build();
    HttpClient::with_config(config).unwrap()
}

fn no_params() -> QueryParams {
    QueryParams::new()
}

#[test]
fn test_config_defaults() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.bearer_token.is_none());
    assert!(config.rate_limit.is_none());
    assert!(config.user_agent.starts_with("tap-gocardless/"));
}

#[test]
fn test_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.gocardless.com")
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .rate_limit(RateLimiterConfig::per_minute(1000))
        .header("GoCardless-Version", "2015-07-06")
        .bearer_token("live_token")
        .build();

    assert_eq!(config.base_url.as_deref(), Some("https://api.gocardless.com"));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::per_minute(1000)));
    assert_eq!(
        config.default_headers.get("GoCardless-Version").map(String::as_str),
        Some("2015-07-06")
    );
    assert_eq!(config.bearer_token.as_deref(), Some("live_token"));
}

#[test]
fn test_debug_redacts_token() {
    let config = HttpClientConfig::builder()
        .bearer_token("super-secret")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(!debug_str.contains("super-secret"));
    assert!(debug_str.contains("***"));
}

#[tokio::test]
async fn test_get_json_sends_query_headers_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payments"))
        .and(query_param("created_at[gt]", "2024-01-01T00:00:00Z"))
        .and(query_param("limit", "100"))
        .and(header("GoCardless-Version", "2015-07-06"))
        .and(header("Authorization", "Bearer sandbox_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payments": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(format!("{}/", server.uri()))
        .header("GoCardless-Version", "2015-07-06")
        .bearer_token("sandbox_token")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let mut params = QueryParams::new();
    params.insert("created_at[gt]".to_string(), "2024-01-01T00:00:00Z".to_string());
    params.insert("limit".to_string(), "100".to_string());

    let body: Value = client.get_json("/payments", &params).await.unwrap();
    assert_eq!(body, json!({"payments": []}));
}

#[tokio::test]
async fn test_empty_params_send_no_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payouts": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_retries(&server, 0);
    let response = client.get("payouts", &no_params()).await.unwrap();
    assert_eq!(response.url().query(), None);
}

#[tokio::test]
async fn test_absolute_url_ignores_base() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .base_url("https://api.gocardless.com")
            .build(),
    )
    .unwrap();

    let body: Value = client
        .get_json(&format!("{}/payouts", server.uri()), &no_params())
        .await
        .unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_error_envelope_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "type": "invalid_api_usage",
                "code": 401,
                "message": "Access token not found",
                "request_id": "0429F9A5C8D1",
                "documentation_url": "https://developer.gocardless.com/api-reference#access_token_not_found",
                "errors": [{"reason": "access_token_not_found", "message": "Access token not found"}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_retries(&server, 3);
    let err = client.get("/customers", &no_params()).await.unwrap_err();

    match &err {
        Error::Api {
            status,
            error_type,
            request_id,
            ..
        } => {
            assert_eq!(*status, 401);
            assert_eq!(error_type, "invalid_api_usage");
            assert_eq!(request_id.as_deref(), Some("0429F9A5C8D1"));
        }
        other => panic!("Expected Api, got {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_plain_error_body_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;

    let client = fast_retries(&server, 3);
    let err = client.get("/missing", &no_params()).await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, ref body } if body == "Not found"));
}

#[tokio::test]
async fn test_server_errors_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/refunds"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/refunds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"refunds": []})))
        .mount(&server)
        .await;

    let client = fast_retries(&server, 3);
    let body: Value = client.get_json("/refunds", &no_params()).await.unwrap();
    assert_eq!(body, json!({"refunds": []}));
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/webhooks"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"type": "gocardless", "code": 500, "message": "Internal server error", "request_id": "R500"}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = fast_retries(&server, 2);
    let err = client.get("/webhooks", &no_params()).await.unwrap_err();

    assert!(matches!(err, Error::Api { status: 500, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_rate_limited_waits_for_reset() {
    let server = MockServer::start().await;

    // Reset already passed: retry without waiting a full window
    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("RateLimit-Limit", "1000")
                .insert_header("RateLimit-Remaining", "0")
                .insert_header("RateLimit-Reset", "Thu, 01 May 2014 16:00:00 GMT")
                .set_body_json(json!({
                    "error": {"type": "invalid_api_usage", "code": 429, "message": "Rate limit exceeded"}
                })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"subscriptions": []})))
        .mount(&server)
        .await;

    let client = fast_retries(&server, 2);
    let started = std::time::Instant::now();
    let body: Value = client.get_json("/subscriptions", &no_params()).await.unwrap();

    assert_eq!(body, json!({"subscriptions": []}));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_rate_limited_without_retries_left() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_retries(&server, 0);
    let err = client.get("/events", &no_params()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 7
        }
    ));
}

#[tokio::test]
async fn test_rate_limiter_in_request_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events": []})))
        .expect(3)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .rate_limit(RateLimiterConfig {
            requests_per_minute: 6000,
            burst_size: 3,
        })
        .build();
    let client = HttpClient::with_config(config).unwrap();

    for _ in 0..3 {
        let _: Value = client.get_json("/events", &no_params()).await.unwrap();
    }
    assert!(format!("{client:?}").contains("rate_limited: true"));
}

fn backoff_client(backoff_type: BackoffType, max: Duration) -> HttpClient {
    let config = HttpClientConfig::builder()
        .backoff(backoff_type, Duration::from_millis(100), max)
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_calculate_backoff_schedules() {
    let constant = backoff_client(BackoffType::Constant, Duration::from_secs(10));
    assert_eq!(constant.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(constant.calculate_backoff(5), Duration::from_millis(100));

    let linear = backoff_client(BackoffType::Linear, Duration::from_secs(10));
    assert_eq!(linear.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(linear.calculate_backoff(2), Duration::from_millis(300));

    let exponential = backoff_client(BackoffType::Exponential, Duration::from_secs(10));
    assert_eq!(exponential.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(exponential.calculate_backoff(3), Duration::from_millis(800));
}

#[test]
fn test_calculate_backoff_respects_max() {
    let client = backoff_client(BackoffType::Exponential, Duration::from_millis(500));
    assert_eq!(client.calculate_backoff(10), Duration::from_millis(500));
    assert_eq!(client.calculate_backoff(40), Duration::from_millis(500));
}
