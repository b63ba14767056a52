/*!
 * # Metrics Module
 *
 * Prometheus counters for the schedules API, exposed in text format at
 * `/metrics`.
 */

use lazy_static::lazy_static;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

lazy_static! {
    pub static ref SCHEDULE_FETCHES: IntCounter = register_int_counter!(
        "schedule_fetches_total",
        "Total number of schedule collection reads"
    )
    .expect("schedule_fetches_total registers once");

    pub static ref SCHEDULE_SAVES: IntCounter = register_int_counter!(
        "schedule_saves_total",
        "Total number of schedule collection writes"
    )
    .expect("schedule_saves_total registers once");

    pub static ref BACKEND_FAILURES: IntCounter = register_int_counter!(
        "schedule_backend_failures_total",
        "Total number of failed key-value backend operations"
    )
    .expect("schedule_backend_failures_total registers once");
}

/// Gathers all registered metrics in Prometheus text format.
pub async fn metrics_handler() -> Result<String, MetricsError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| MetricsError::ExportError(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| MetricsError::ExportError(e.to_string()))
}
