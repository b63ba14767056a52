//! Two-tier persistence for the client.
//!
//! The remote store is authoritative when reachable; the local cache is the
//! durable fallback. Loads try the remote first and fall back to the cache,
//! persists always write the cache and then try the remote. Neither side is
//! retried.

pub mod local;
pub mod remote;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::ScheduleRecord;
pub use local::{CacheError, FileCache, LocalCache, MemoryCache};
pub use remote::{HttpRemoteSchedules, RemoteError, RemoteSchedules, SCHEDULES_PATH};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("local cache failed: {0}")]
    Cache(#[from] CacheError),
}

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    LocalCache,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSchedules {
    pub records: Vec<ScheduleRecord>,
    pub source: LoadSource,
}

/// Result of a persist call. The local cache write always succeeded when
/// this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    pub remote_saved: bool,
}

#[derive(Clone)]
pub struct SyncGateway {
    remote: Arc<dyn RemoteSchedules>,
    cache: Arc<dyn LocalCache>,
}

impl SyncGateway {
    pub fn new(remote: Arc<dyn RemoteSchedules>, cache: Arc<dyn LocalCache>) -> Self {
        Self { remote, cache }
    }

    /// Fetches the collection from the remote store, falling back to the
    /// cached snapshot (or an empty collection) when the remote fails.
    pub async fn load(&self) -> Result<LoadedSchedules, SyncError> {
        match self.remote.fetch_all().await {
            Ok(records) => {
                info!(count = records.len(), "loaded schedules from remote store");
                Ok(LoadedSchedules {
                    records,
                    source: LoadSource::Remote,
                })
            }
            Err(err) => {
                warn!(error = %err, "remote load failed, falling back to local cache");
                let records = self.cache.read()?.unwrap_or_default();
                info!(count = records.len(), "loaded schedules from local cache");
                Ok(LoadedSchedules {
                    records,
                    source: LoadSource::LocalCache,
                })
            }
        }
    }

    /// Writes the full collection to the local cache, then to the remote
    /// store. A remote failure is logged and reported in the outcome only.
    pub async fn persist(&self, records: &[ScheduleRecord]) -> Result<PersistOutcome, SyncError> {
        self.cache.write(records)?;

        let remote_saved = match self.remote.save_all(records).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, count = records.len(), "remote save failed; local cache is up to date");
                false
            }
        };
        Ok(PersistOutcome { remote_saved })
    }
}
