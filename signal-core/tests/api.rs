mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use signal_common::{BacktestRecord, Signal, SignalKind};
use signal_core::api;
use std::sync::Arc;
use tower::ServiceExt;

use common::*;

fn app(short_window: usize, long_window: usize) -> Router {
    let (_store, service) = service_with(golden_then_death_cross(), short_window, long_window);
    api::router(Arc::new(service))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_prices_endpoint_returns_series() {
    let app = app(5, 20);

    let (status, body) = send(&app, get("/api/prices")).await;

    assert_eq!(status, StatusCode::OK);
    let bars = body.as_array().unwrap();
    assert_eq!(bars.len(), 130);
    assert_eq!(bars[0]["date"], "2015-01-01");
}

#[tokio::test]
async fn test_generate_then_list_signals() {
    let app = app(5, 20);

    let (status, body) = send(&app, post_json("/api/signals/generate", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Generated", "count": 2 }));

    let (status, body) = send(&app, get("/api/signals")).await;
    assert_eq!(status, StatusCode::OK);
    let signals: Vec<Signal> = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0].kind, SignalKind::Sell);
    assert_eq!(body[0]["kind"], "SELL");
    assert!(body[0].get("createdAt").is_some());
}

#[tokio::test]
async fn test_generate_without_enough_data() {
    let (_store, service) = service_with(flat(10, rust_decimal::Decimal::ONE_HUNDRED), 5, 20);
    let app = api::router(Arc::new(service));

    let (status, body) = send(&app, post_json("/api/signals/generate", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Not enough data", "count": 0 }));
}

#[tokio::test]
async fn test_backtest_endpoint_stores_record() {
    let app = app(5, 20);

    let (status, body) = send(
        &app,
        post_json(
            "/api/backtest",
            json!({ "startDate": "2015-01-01", "endDate": "2015-05-10" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Backtest 5/20");
    assert_eq!(body["shortWindow"], 5);
    assert_eq!(body["longWindow"], 20);
    assert_eq!(body["tradeCount"], 1);
    let record: BacktestRecord = serde_json::from_value(body).unwrap();

    let (status, body) = send(&app, get("/api/backtests")).await;
    assert_eq!(status, StatusCode::OK);
    let history: Vec<BacktestRecord> = serde_json::from_value(body).unwrap();
    assert_eq!(history, vec![record]);
}

#[tokio::test]
async fn test_backtest_range_too_small_is_bad_request() {
    let app = app(5, 20);

    let (status, body) = send(
        &app,
        post_json(
            "/api/backtest",
            json!({ "startDate": "2015-01-01", "endDate": "2015-01-05" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Range too small" }));

    let (_, body) = send(&app, get("/api/backtests")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_backtest_invalid_windows_is_bad_request() {
    let app = app(5, 20);

    let (status, body) = send(
        &app,
        post_json(
            "/api/backtest",
            json!({
                "startDate": "2015-01-01",
                "endDate": "2015-05-10",
                "shortWindow": 0,
                "longWindow": 20
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("windows"));
}

#[tokio::test]
async fn test_storage_failure_on_generate_is_internal_error() {
    let app = api::router(Arc::new(failing_service(5, 20).await));

    let (status, body) = send(&app, post_json("/api/signals/generate", json!({}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Internal server error" }));

    let (status, body) = send(&app, get("/api/signals")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["reason"], "seeded");
}

#[tokio::test]
async fn test_storage_failure_on_backtest_is_internal_error() {
    let app = api::router(Arc::new(failing_service(5, 20).await));

    let (status, body) = send(
        &app,
        post_json(
            "/api/backtest",
            json!({ "startDate": "2015-01-01", "endDate": "2015-05-10" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Internal server error" }));
}

#[tokio::test]
async fn test_backtest_overflow_is_structured_error() {
    let mut closes = vec![rust_decimal::Decimal::new(1, 27); 30];
    closes.extend((2..=40).map(|i| rust_decimal::Decimal::new(i, 27)));
    let (_store, service) = service_with(bars(closes), 5, 20);
    let app = api::router(Arc::new(service));

    let (status, body) = send(
        &app,
        post_json(
            "/api/backtest",
            json!({ "startDate": "2015-01-01", "endDate": "2015-03-11" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("overflow"));
}
