use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

use crate::models::ScheduleRecord;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cached snapshot is not a valid schedule array: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("cache lock poisoned")]
    Poisoned,
}

/// Last-known snapshot of the collection, kept on the client.
///
/// Reads and writes are synchronous and always carry the full collection in
/// the same JSON shape as the remote payload.
pub trait LocalCache: Send + Sync {
    /// `Ok(None)` when nothing has been cached yet.
    fn read(&self) -> Result<Option<Vec<ScheduleRecord>>, CacheError>;

    fn write(&self, records: &[ScheduleRecord]) -> Result<(), CacheError>;
}

/// JSON file cache.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LocalCache for FileCache {
    fn read(&self) -> Result<Option<Vec<ScheduleRecord>>, CacheError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cached schedules yet");
                return Ok(None);
            }
            Err(err) => return Err(self.io_error(err)),
        };
        let records = serde_json::from_str(&text).map_err(CacheError::Corrupt)?;
        Ok(Some(records))
    }

    fn write(&self, records: &[ScheduleRecord]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let text = serde_json::to_string(records).map_err(CacheError::Corrupt)?;

        // Replace atomically through a sibling temp file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), count = records.len(), "cached schedules");
        Ok(())
    }
}

/// In-process cache holding the serialized snapshot.
#[derive(Debug, Default)]
pub struct MemoryCache {
    snapshot: Mutex<Option<String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: &[ScheduleRecord]) -> Result<Self, CacheError> {
        let cache = Self::new();
        cache.write(records)?;
        Ok(cache)
    }
}

impl LocalCache for MemoryCache {
    fn read(&self) -> Result<Option<Vec<ScheduleRecord>>, CacheError> {
        let snapshot = self.snapshot.lock().map_err(|_| CacheError::Poisoned)?;
        snapshot
            .as_deref()
            .map(|text| serde_json::from_str(text).map_err(CacheError::Corrupt))
            .transpose()
    }

    fn write(&self, records: &[ScheduleRecord]) -> Result<(), CacheError> {
        let text = serde_json::to_string(records).map_err(CacheError::Corrupt)?;
        *self.snapshot.lock().map_err(|_| CacheError::Poisoned)? = Some(text);
        Ok(())
    }
}
