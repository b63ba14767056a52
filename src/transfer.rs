//! JSON file export and import of the whole collection.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::models::ScheduleRecord;

const EXPORT_FILE_PREFIX: &str = "일일실적";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("file must contain a JSON array of schedules")]
    NotAnArray,

    #[error("invalid schedule entry: {0}")]
    InvalidRecord(#[source] serde_json::Error),
}

/// Download name for an export taken on `date`, e.g. `일일실적_2024-05-01.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}_{}.json", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Pretty-printed JSON array with two-space indentation.
pub fn export_json(records: &[ScheduleRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Parses an exported file. Anything other than a top-level array of
/// records is rejected.
pub fn import_json(text: &str) -> Result<Vec<ScheduleRecord>, ImportError> {
    let value: Value = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;
    if !value.is_array() {
        return Err(ImportError::NotAnArray);
    }
    serde_json::from_value(value).map_err(ImportError::InvalidRecord)
}
