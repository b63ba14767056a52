mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, StatusCode},
};
use dispatch_board::remote_store::ScheduleBackend;
use serde_json::json;

use common::{response_json, FailingBackend, TestApp};

fn sample_payload() -> serde_json::Value {
    json!([
        {
            "id": "6f1c2a8e-3b4d-4e5f-8a9b-0c1d2e3f4a5b",
            "phoneNumber": "01029747002",
            "customerCode": "9_9549",
            "address": "기장군.정관로350 이지더원3차아파트 309동 102호",
            "date": "2024-09-02",
            "status": 1
        },
        {
            "id": "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d",
            "phoneNumber": "0512345678",
            "customerCode": "A-17",
            "address": "해운대구 우동 1418",
            "date": "2024-09-02",
            "status": 4
        }
    ])
}

#[tokio::test]
async fn get_returns_empty_array_before_first_save() {
    let app = TestApp::new();

    let response = app.request_json(Method::GET, "/api/schedules", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!([]));
}

#[tokio::test]
async fn post_then_get_returns_saved_collection() {
    let app = TestApp::new();

    let response = app
        .request_json(Method::POST, "/api/schedules", Some(sample_payload()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "success": true }));

    let response = app.request_json(Method::GET, "/api/schedules", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, sample_payload());
}

#[tokio::test]
async fn post_overwrites_previous_collection() {
    let app = TestApp::new();
    app.request_json(Method::POST, "/api/schedules", Some(sample_payload()))
        .await;

    let response = app
        .request_json(Method::POST, "/api/schedules", Some(json!([])))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request_json(Method::GET, "/api/schedules", None).await;
    assert_eq!(response_json(response).await, json!([]));
}

#[tokio::test]
async fn other_methods_are_rejected_with_405() {
    let app = TestApp::new();

    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let response = app.request_json(method, "/api/schedules", None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response_json(response).await,
            json!({ "error": "Method not allowed" })
        );
    }
}

#[tokio::test]
async fn backend_read_failure_is_500_without_details() {
    let app = TestApp::with_backend(Arc::new(FailingBackend));

    let response = app.request_json(Method::GET, "/api/schedules", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response_json(response).await,
        json!({ "error": "Failed to fetch data" })
    );
}

#[tokio::test]
async fn backend_write_failure_is_500_without_details() {
    let app = TestApp::with_backend(Arc::new(FailingBackend));

    let response = app
        .request_json(Method::POST, "/api/schedules", Some(sample_payload()))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response_json(response).await,
        json!({ "error": "Failed to save data" })
    );
}

#[tokio::test]
async fn non_array_body_is_rejected_and_nothing_is_written() {
    let app = TestApp::new();

    let response = app
        .request_json(Method::POST, "/api/schedules", Some(json!({ "phoneNumber": "01012345678" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response_json(response).await,
        json!({ "error": "Invalid request body" })
    );

    let response = app
        .request(Method::POST, "/api/schedules", Some(Body::from("not json")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.backend.get().await.unwrap().is_none());
}

/// A valid record array of roughly `count` KiB.
fn bulky_payload(count: usize) -> serde_json::Value {
    let address = "해운대구 우동 1418 ".repeat(40);
    let records: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "id": uuid::Uuid::new_v4(),
                "phoneNumber": "01029747002",
                "customerCode": format!("9_{}", i),
                "address": address,
                "date": "2024-09-02",
                "status": 1
            })
        })
        .collect();
    json!(records)
}

#[tokio::test]
async fn body_over_configured_limit_is_413_and_nothing_is_written() {
    let app = TestApp::with_max_body_size(64 * 1024);

    let response = app
        .request_json(Method::POST, "/api/schedules", Some(bulky_payload(200)))
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        response_json(response).await,
        json!({ "error": "Request body too large" })
    );
    assert!(app.backend.get().await.unwrap().is_none());
}

#[tokio::test]
async fn raised_limit_accepts_collections_past_two_mebibytes() {
    let app = TestApp::with_max_body_size(8 * 1024 * 1024);
    let payload = bulky_payload(3_000);
    assert!(serde_json::to_vec(&payload).unwrap().len() > 2 * 1024 * 1024);

    let response = app
        .request_json(Method::POST, "/api/schedules", Some(payload))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let stored = app.backend.get().await.unwrap().unwrap();
    assert!(stored.len() > 2 * 1024 * 1024);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new();

    let response = app.request_json(Method::GET, "/api/schedules", None).await;

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn health_reports_version() {
    let app = TestApp::new();

    let response = app.request_json(Method::GET, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn metrics_are_exported_as_text() {
    let app = TestApp::new();
    app.request_json(Method::GET, "/api/schedules", None).await;

    let response = app.request_json(Method::GET, "/metrics", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("schedule_fetches_total"));
}
