//! Dispatch Board Library
//!
//! Turns pasted dispatch texts into a schedule list with per-entry work
//! status, keeps it in sync with a shared key-value store and summarizes it
//! by status.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware_helpers;
pub mod models;
pub mod parser;
pub mod phone;
pub mod remote_store;
pub mod store;
pub mod sync;
pub mod tracing;
pub mod transfer;
pub mod views;

use axum::{extract::DefaultBodyLimit, Router};

use crate::remote_store::RemoteStore;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub remote_store: RemoteStore,
    pub config: config::AppConfig,
}

/// Routes under `/api`.
pub fn api_routes() -> Router<AppState> {
    handlers::schedules::schedule_routes()
}

/// Full application router with request ids, HTTP tracing and the
/// configured body limit applied.
///
/// Transport concerns that depend on deployment (CORS, compression) are
/// layered on by the server binary.
pub fn app_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;
    Router::new()
        .nest("/api", api_routes())
        .merge(handlers::health::health_routes())
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

pub mod prelude {
    pub use crate::dashboard::{Confirmation, Dashboard, StoreEvent};
    pub use crate::errors::{ApiError, ServiceError};
    pub use crate::models::{ScheduleRecord, ScheduleStatus};
    pub use crate::parser::{parse_schedule_text, ParsedSchedule};
    pub use crate::phone::format_phone_number;
    pub use crate::store::ScheduleStore;
    pub use crate::sync::{LoadSource, SyncGateway};
}
