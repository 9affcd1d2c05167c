//! Integration tests for rsm-rs API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Review batches: default size, limit bounds, seeded reproducibility

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use rsm_rs::{build_router, AppState};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

fn setup_app() -> axum::Router {
    build_router(AppState::new())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn fetch(uri: &str) -> (StatusCode, Value) {
    let response = setup_app().oneshot(get(uri)).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = fetch("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "rsm-rs");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_reviews_default_limit() {
    let (status, body) = fetch("/reviews").await;

    assert_eq!(status, StatusCode::OK);
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 50);

    let first = &reviews[0];
    for field in [
        "review_id",
        "business_id",
        "restaurant_name",
        "city",
        "text",
        "created_at",
    ] {
        assert!(first[field].is_string(), "missing {}", field);
    }
    let stars = first["stars"].as_i64().unwrap();
    assert!((1..=5).contains(&stars));
}

#[tokio::test]
async fn test_reviews_limit_bounds() {
    let (status, body) = fetch("/reviews?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = fetch("/reviews?limit=500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 500);

    for uri in ["/reviews?limit=0", "/reviews?limit=501", "/reviews?limit=-3"] {
        let (status, body) = fetch(uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_reviews_non_numeric_limit_is_bad_request() {
    let (status, body) = fetch("/reviews?limit=many").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

/// Reviews without their wall-clock dependent `created_at`
fn without_timestamps(v: &Value) -> Vec<Value> {
    v.as_array()
        .unwrap()
        .iter()
        .map(|r| {
            let mut r = r.clone();
            r.as_object_mut().unwrap().remove("created_at");
            r
        })
        .collect()
}

#[tokio::test]
async fn test_reviews_seed_is_reproducible() {
    let (_, a) = fetch("/reviews?limit=10&seed=42").await;
    let (_, b) = fetch("/reviews?limit=10&seed=42").await;
    assert_eq!(without_timestamps(&a), without_timestamps(&b));
}

#[tokio::test]
async fn test_reviews_accept_negative_seed() {
    let (status, a) = fetch("/reviews?limit=10&seed=-7").await;
    assert_eq!(status, StatusCode::OK);
    let (_, b) = fetch("/reviews?limit=10&seed=-7").await;
    assert_eq!(without_timestamps(&a), without_timestamps(&b));

    let (_, positive) = fetch("/reviews?limit=10&seed=7").await;
    assert_ne!(without_timestamps(&a), without_timestamps(&positive));
}
