//! Schedule dashboard controller.
//!
//! Owns the in-memory collection and applies every user command to it,
//! refreshes the statistics panel, persists through the [`SyncGateway`] and
//! announces the change on a broadcast channel. Commands are awaited one at a
//! time, so persists reach the gateway in the order they were issued.

use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{ScheduleRecord, ScheduleStatus};
use crate::parser::parse_schedule_text;
use crate::store::ScheduleStore;
use crate::sync::{LoadSource, PersistOutcome, SyncGateway};
use crate::transfer;
use crate::views::{render_rows, ScheduleRow, StatsView};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change notifications for subscribed views.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Loaded { count: usize, source: LoadSource },
    Added { index: usize, id: Uuid },
    StatusChanged { index: usize, status: ScheduleStatus },
    Removed { index: usize, id: Uuid },
    Replaced { count: usize },
}

/// Explicit answer to the delete prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

pub struct Dashboard {
    store: ScheduleStore,
    gateway: SyncGateway,
    stats_view: StatsView,
    events: broadcast::Sender<StoreEvent>,
    last_persist: Option<PersistOutcome>,
}

impl Dashboard {
    pub fn new(gateway: SyncGateway) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store: ScheduleStore::new(),
            gateway,
            stats_view: StatsView::new(),
            events,
            last_persist: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Loads the collection (remote first, then local cache) without
    /// writing it back.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self) -> Result<LoadSource, ServiceError> {
        let loaded = self.gateway.load().await?;
        let count = loaded.records.len();
        self.store.replace_all(loaded.records);
        self.stats_view.refresh(self.store.records());
        info!(count, source = ?loaded.source, "dashboard initialized");
        self.publish(StoreEvent::Loaded {
            count,
            source: loaded.source,
        });
        Ok(loaded.source)
    }

    /// Parses a dispatch text and appends it as a new `입고` entry.
    /// Returns the index of the new record.
    #[instrument(skip(self, text))]
    pub async fn add_from_text(
        &mut self,
        text: &str,
        today: NaiveDate,
    ) -> Result<usize, ServiceError> {
        let parsed = parse_schedule_text(text)?;
        let previous = self.store.clone();
        let index = self.store.add(parsed, today);
        let id = self.store.records()[index].id;
        self.commit(previous, StoreEvent::Added { index, id }).await?;
        Ok(index)
    }

    pub async fn set_status(&mut self, index: usize, code: u8) -> Result<(), ServiceError> {
        let previous = self.store.clone();
        self.store.set_status_code(index, code)?;
        let status = self.store.records()[index].status;
        self.commit(previous, StoreEvent::StatusChanged { index, status })
            .await
    }

    /// Removes the record at `index` once the deletion is confirmed.
    /// A declined confirmation leaves everything untouched and yields `None`.
    pub async fn remove(
        &mut self,
        index: usize,
        confirmation: Confirmation,
    ) -> Result<Option<ScheduleRecord>, ServiceError> {
        if confirmation == Confirmation::Declined {
            debug!(index, "deletion declined");
            return Ok(None);
        }
        let previous = self.store.clone();
        let removed = self.store.remove(index)?;
        self.commit(
            previous,
            StoreEvent::Removed {
                index,
                id: removed.id,
            },
        )
        .await?;
        Ok(Some(removed))
    }

    /// Replaces the whole collection with an exported file's contents.
    /// Invalid input leaves the collection unchanged.
    pub async fn import_json(&mut self, text: &str) -> Result<usize, ServiceError> {
        let records = transfer::import_json(text)?;
        let count = records.len();
        let previous = self.store.clone();
        self.store.replace_all(records);
        self.commit(previous, StoreEvent::Replaced { count }).await?;
        Ok(count)
    }

    /// Dated file name and pretty JSON for the current collection.
    pub fn export_json(&self, today: NaiveDate) -> Result<(String, String), ServiceError> {
        let json = transfer::export_json(self.store.records())?;
        Ok((transfer::export_file_name(today), json))
    }

    pub fn records(&self) -> &[ScheduleRecord] {
        self.store.records()
    }

    pub fn rows(&self) -> Vec<ScheduleRow> {
        render_rows(self.store.records())
    }

    pub fn stats_view(&self) -> &StatsView {
        &self.stats_view
    }

    pub fn stats_text(&self) -> String {
        self.stats_view.text()
    }

    /// Outcome of the most recent persist, if any command has persisted.
    pub fn last_persist(&self) -> Option<PersistOutcome> {
        self.last_persist
    }

    /// Persists the mutated collection. When the local cache rejects it the
    /// collection is put back to `previous` and nothing is announced.
    async fn commit(&mut self, previous: ScheduleStore, event: StoreEvent) -> Result<(), ServiceError> {
        match self.gateway.persist(self.store.records()).await {
            Ok(outcome) => {
                self.stats_view.refresh(self.store.records());
                self.last_persist = Some(outcome);
                self.publish(event);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "persist failed, reverting change");
                self.store = previous;
                Err(err.into())
            }
        }
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
