use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::ScheduleRecord;

/// Path of the schedules resource on the remote store.
pub const SCHEDULES_PATH: &str = "/api/schedules";

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to remote store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote store answered with status {0}")]
    Status(u16),
}

/// Whole-collection access to the remote schedules store.
#[async_trait]
pub trait RemoteSchedules: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<ScheduleRecord>, RemoteError>;

    async fn save_all(&self, records: &[ScheduleRecord]) -> Result<(), RemoteError>;
}

/// `RemoteSchedules` over the HTTP API served by this crate.
#[derive(Debug, Clone)]
pub struct HttpRemoteSchedules {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRemoteSchedules {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SCHEDULES_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteSchedules for HttpRemoteSchedules {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_all(&self) -> Result<Vec<ScheduleRecord>, RemoteError> {
        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }
        let records: Vec<ScheduleRecord> = response.json().await?;
        debug!(count = records.len(), "fetched schedules from remote store");
        Ok(records)
    }

    #[instrument(skip(self, records), fields(endpoint = %self.endpoint, count = records.len()))]
    async fn save_all(&self, records: &[ScheduleRecord]) -> Result<(), RemoteError> {
        let response = self.client.post(&self.endpoint).json(records).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }
        debug!("saved schedules to remote store");
        Ok(())
    }
}
