use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::{metrics::metrics_handler, AppState};

/// Liveness probe
async fn liveness_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "backend": state.config.backend,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn metrics() -> impl IntoResponse {
    match metrics_handler().await {
        Ok(body) => (StatusCode::OK, body),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("metrics error"),
        ),
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness_check))
        .route("/metrics", get(metrics))
}
