//! `/api/schedules`: whole-collection read and overwrite.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::{errors::ApiError, models::ScheduleRecord, AppState};

/// Returns the stored collection, or `[]` when nothing has been saved.
#[instrument(skip(state))]
pub async fn list_schedules(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleRecord>>, ApiError> {
    let records = state
        .remote_store
        .fetch()
        .await
        .map_err(ApiError::FetchFailed)?;
    Ok(Json(records))
}

/// Replaces the stored collection with the request body.
#[instrument(skip(state, payload))]
pub async fn replace_schedules(
    State(state): State<AppState>,
    payload: Result<Json<Vec<ScheduleRecord>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(records) = payload.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
        _ => ApiError::InvalidBody(rejection.body_text()),
    })?;

    state
        .remote_store
        .save(&records)
        .await
        .map_err(ApiError::SaveFailed)?;

    info!(count = records.len(), "schedules replaced");
    Ok(Json(json!({ "success": true })))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Creates the router for schedule endpoints
pub fn schedule_routes() -> Router<AppState> {
    Router::new().route(
        "/schedules",
        get(list_schedules)
            .post(replace_schedules)
            .fallback(method_not_allowed),
    )
}
