//! Server-side schedules store: one JSON array under one key.
//!
//! Reads and writes always move the whole collection. There is no versioning
//! or conflict detection; the last write wins.

use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::metrics::{BACKEND_FAILURES, SCHEDULE_FETCHES, SCHEDULE_SAVES};
use crate::models::ScheduleRecord;

/// Key used when none is configured.
pub const DEFAULT_SCHEDULES_KEY: &str = "schedules";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend connection failed: {0}")]
    Connection(String),

    #[error("backend command failed: {0}")]
    Command(String),

    #[error("stored value is not a schedule array: {0}")]
    Decode(String),

    #[error("failed to encode schedules: {0}")]
    Encode(String),
}

/// Raw key-value access for the serialized collection.
#[async_trait]
pub trait ScheduleBackend: Send + Sync {
    /// Serialized collection, `None` when the key has never been written.
    async fn get(&self) -> Result<Option<String>, BackendError>;

    async fn set(&self, value: String) -> Result<(), BackendError>;
}

/// Redis backend. A connection is opened for each call and dropped when the
/// call returns.
#[derive(Clone)]
pub struct RedisBackend {
    client: redis::Client,
    key: String,
}

impl RedisBackend {
    pub fn new(redis_url: &str, key: impl Into<String>) -> Result<Self, BackendError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            key: key.into(),
        })
    }

    async fn connection(&self) -> Result<redis::aio::Connection, BackendError> {
        self.client
            .get_async_connection()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ScheduleBackend for RedisBackend {
    #[instrument(skip(self), fields(key = %self.key))]
    async fn get(&self) -> Result<Option<String>, BackendError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(&self.key)
            .await
            .map_err(|e| BackendError::Command(format!("GET failed: {}", e)))?;
        debug!(found = value.is_some(), "read schedules key");
        Ok(value)
    }

    #[instrument(skip(self, value), fields(key = %self.key, bytes = value.len()))]
    async fn set(&self, value: String) -> Result<(), BackendError> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(&self.key, value)
            .await
            .map_err(|e| BackendError::Command(format!("SET failed: {}", e)))?;
        debug!("wrote schedules key");
        Ok(())
    }
}

/// Process-local backend for development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    value: Arc<RwLock<Option<String>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleBackend for InMemoryBackend {
    async fn get(&self) -> Result<Option<String>, BackendError> {
        Ok(self.value.read().await.clone())
    }

    async fn set(&self, value: String) -> Result<(), BackendError> {
        *self.value.write().await = Some(value);
        Ok(())
    }
}

#[derive(Deserialize)]
struct StoredId {
    #[serde(default)]
    id: Option<Uuid>,
}

/// Decodes a stored blob and reports whether any record lacked an id.
fn decode(json: &str) -> Result<(Vec<ScheduleRecord>, bool), BackendError> {
    let records: Vec<ScheduleRecord> =
        serde_json::from_str(json).map_err(|e| BackendError::Decode(e.to_string()))?;
    let ids: Vec<StoredId> =
        serde_json::from_str(json).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok((records, ids.iter().any(|stored| stored.id.is_none())))
}

/// Typed façade over a [`ScheduleBackend`].
#[derive(Clone)]
pub struct RemoteStore {
    backend: Arc<dyn ScheduleBackend>,
}

impl RemoteStore {
    pub fn new(backend: Arc<dyn ScheduleBackend>) -> Self {
        Self { backend }
    }

    /// Stored collection, empty when nothing has been saved yet.
    ///
    /// Records stored without an id are given one on read; the assigned ids
    /// are written back once so later reads return the same ids.
    pub async fn fetch(&self) -> Result<Vec<ScheduleRecord>, BackendError> {
        SCHEDULE_FETCHES.inc();
        let result = match self.backend.get().await {
            Ok(Some(json)) => decode(&json),
            Ok(None) => Ok((Vec::new(), false)),
            Err(err) => Err(err),
        };
        let (records, missing_ids) = result.map_err(|err| {
            BACKEND_FAILURES.inc();
            err
        })?;

        if missing_ids {
            match self.save(&records).await {
                Ok(()) => info!(count = records.len(), "assigned ids to stored schedules"),
                Err(err) => warn!(error = %err, "could not store assigned schedule ids"),
            }
        }
        Ok(records)
    }

    /// Overwrites the stored collection.
    pub async fn save(&self, records: &[ScheduleRecord]) -> Result<(), BackendError> {
        SCHEDULE_SAVES.inc();
        let json =
            serde_json::to_string(records).map_err(|e| BackendError::Encode(e.to_string()))?;
        self.backend.set(json).await.map_err(|err| {
            BACKEND_FAILURES.inc();
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleStatus;
    use crate::parser::parse_schedule_text;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn store() -> (RemoteStore, InMemoryBackend) {
        let backend = InMemoryBackend::new();
        (RemoteStore::new(Arc::new(backend.clone())), backend)
    }

    #[tokio::test]
    async fn absent_key_reads_as_empty() {
        let (store, _) = store();
        assert!(store.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_overwrites_whole_collection() {
        let (store, backend) = store();
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let first = vec![
            ScheduleRecord::new(parse_schedule_text("01011112222☏A 중구").unwrap(), date),
            ScheduleRecord::new(parse_schedule_text("01033334444☏B 서구").unwrap(), date),
        ];
        store.save(&first).await.unwrap();
        let second = vec![first[1].clone()];
        store.save(&second).await.unwrap();

        assert_eq!(store.fetch().await.unwrap(), second);
        let raw = backend.get().await.unwrap().unwrap();
        assert!(raw.starts_with('['));
    }

    #[tokio::test]
    async fn records_without_ids_keep_their_assigned_ids() {
        let (store, backend) = store();
        backend
            .set(
                r#"[{"phoneNumber":"01011112222","customerCode":"A","address":"중구","date":"2024-09-01","status":3}]"#
                    .into(),
            )
            .await
            .unwrap();

        let first = store.fetch().await.unwrap();
        let second = store.fetch().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].status, ScheduleStatus::SiteCancelled);
        let raw = backend.get().await.unwrap().unwrap();
        assert!(raw.contains(&first[0].id.to_string()));
    }

    #[tokio::test]
    async fn undecodable_blob_is_a_backend_error() {
        let (store, backend) = store();
        backend.set("{\"not\":\"an array\"}".into()).await.unwrap();
        assert_matches!(store.fetch().await, Err(BackendError::Decode(_)));
    }
}
