//! In-memory schedule collection.
//!
//! The store owns the ordered list of records and exposes plain state
//! transitions. It does no I/O; callers persist the snapshot after each
//! mutation (see [`crate::dashboard::Dashboard`]).
//!
//! Records are addressed by their insertion index, which is what the table
//! controls carry. Every record also has a stable id for callers that would
//! rather not depend on positions.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{InvalidStatusCode, ScheduleRecord, ScheduleStatus};
use crate::parser::ParsedSchedule;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no schedule at index {index} (collection has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatusCode),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleStore {
    records: Vec<ScheduleRecord>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ScheduleRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScheduleRecord> {
        self.records.get(index)
    }

    /// Insertion index of the record with the given id.
    pub fn index_of(&self, id: Uuid) -> Option<usize> {
        self.iter().position(|record| record.id == id)
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ScheduleRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleRecord> {
        self.records.iter()
    }

    /// Appends a freshly received record dated `date` and returns its index.
    pub fn add(&mut self, parsed: ParsedSchedule, date: NaiveDate) -> usize {
        self.records.push(ScheduleRecord::new(parsed, date));
        self.records.len() - 1
    }

    pub fn set_status(&mut self, index: usize, status: ScheduleStatus) -> Result<(), StoreError> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        record.status = status;
        Ok(())
    }

    /// Same as [`set_status`](Self::set_status) for a raw selector value.
    /// Codes outside 1..=5 are rejected and leave the record untouched.
    pub fn set_status_code(&mut self, index: usize, code: u8) -> Result<(), StoreError> {
        let status = ScheduleStatus::try_from(code)?;
        self.set_status(index, status)
    }

    /// Removes the record at `index`; later records shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<ScheduleRecord, StoreError> {
        if index >= self.records.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// Replaces the whole collection.
    pub fn replace_all(&mut self, records: Vec<ScheduleRecord>) {
        self.records = records;
    }

    /// Copy of the collection for serialization.
    pub fn export_snapshot(&self) -> Vec<ScheduleRecord> {
        self.records.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parsed(phone: &str, code: &str) -> ParsedSchedule {
        ParsedSchedule {
            phone_number: phone.to_string(),
            customer_code: code.to_string(),
            address: "부산진구".to_string(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn store_with(codes: &[&str]) -> ScheduleStore {
        let mut store = ScheduleStore::new();
        for code in codes {
            store.add(parsed("01012345678", code), day());
        }
        store
    }

    #[test]
    fn add_appends_received_record_with_date() {
        let mut store = ScheduleStore::new();
        let index = store.add(parsed("01012345678", "A1"), day());

        assert_eq!(index, 0);
        let record = store.get(0).unwrap();
        assert_eq!(record.status, ScheduleStatus::Received);
        assert_eq!(record.date, day());
        assert_eq!(record.customer_code, "A1");
    }

    #[test]
    fn set_status_updates_in_place() {
        let mut store = store_with(&["A1", "B2"]);
        store.set_status(1, ScheduleStatus::SiteCompleted).unwrap();

        assert_eq!(store.get(0).unwrap().status, ScheduleStatus::Received);
        assert_eq!(store.get(1).unwrap().status, ScheduleStatus::SiteCompleted);
    }

    #[test]
    fn set_status_out_of_range_index_fails() {
        let mut store = store_with(&["A1"]);
        assert_matches!(
            store.set_status(1, ScheduleStatus::SiteCancelled),
            Err(StoreError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn unknown_status_code_is_rejected_without_change() {
        let mut store = store_with(&["A1"]);
        assert_matches!(
            store.set_status_code(0, 9),
            Err(StoreError::InvalidStatus(InvalidStatusCode(9)))
        );
        assert_eq!(store.get(0).unwrap().status, ScheduleStatus::Received);

        store.set_status_code(0, 2).unwrap();
        assert_eq!(store.get(0).unwrap().status, ScheduleStatus::VisitCancelled);
    }

    #[test]
    fn remove_shifts_later_records_down() {
        let mut store = store_with(&["A1", "B2", "C3"]);
        let removed = store.remove(1).unwrap();

        assert_eq!(removed.customer_code, "B2");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().customer_code, "C3");
        assert_matches!(store.remove(2), Err(StoreError::IndexOutOfRange { .. }));
    }

    #[test]
    fn index_of_follows_record_after_removal() {
        let mut store = store_with(&["A1", "B2", "C3"]);
        let id = store.get(2).unwrap().id;
        store.remove(0).unwrap();
        assert_eq!(store.index_of(id), Some(1));
    }

    #[test]
    fn replace_all_and_snapshot() {
        let mut store = store_with(&["A1"]);
        let other = store_with(&["X1", "Y2"]).export_snapshot();
        store.replace_all(other.clone());

        assert_eq!(store.export_snapshot(), other);
        assert_eq!(store.records().len(), 2);
    }
}
