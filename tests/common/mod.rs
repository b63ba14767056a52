#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use dispatch_board::{
    app_router,
    config::AppConfig,
    remote_store::{BackendError, InMemoryBackend, RemoteStore, ScheduleBackend},
    AppState,
};

/// Backend that fails every call, standing in for an unreachable Redis.
pub struct FailingBackend;

#[async_trait]
impl ScheduleBackend for FailingBackend {
    async fn get(&self) -> Result<Option<String>, BackendError> {
        Err(BackendError::Connection("connection refused (os error 111)".into()))
    }

    async fn set(&self, _value: String) -> Result<(), BackendError> {
        Err(BackendError::Command("READONLY You can't write against a read only replica.".into()))
    }
}

/// Router harness over a swappable schedule backend.
pub struct TestApp {
    router: Router,
    pub backend: Arc<dyn ScheduleBackend>,
}

impl TestApp {
    /// Application over a fresh in-memory backend.
    pub fn new() -> Self {
        Self::with_backend(Arc::new(InMemoryBackend::new()))
    }

    pub fn with_backend(backend: Arc<dyn ScheduleBackend>) -> Self {
        Self::with_config(backend, |_| {})
    }

    /// In-memory application whose request bodies may not exceed `limit` bytes.
    pub fn with_max_body_size(limit: usize) -> Self {
        Self::with_config(Arc::new(InMemoryBackend::new()), |cfg| cfg.max_body_size = limit)
    }

    fn with_config(backend: Arc<dyn ScheduleBackend>, customize: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
            "redis://127.0.0.1:6379".to_string(),
        );
        cfg.backend = "in-memory".to_string();
        customize(&mut cfg);

        let state = AppState {
            remote_store: RemoteStore::new(backend.clone()),
            config: cfg,
        };
        Self {
            router: app_router(state),
            backend,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Body>) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                builder = builder.header("content-type", "application/json");
                body
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn request_json(&self, method: Method, uri: &str, body: Option<Value>) -> axum::response::Response {
        let body = body.map(|json| {
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        });
        self.request(method, uri, body).await
    }
}

pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}
