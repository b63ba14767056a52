use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;
use uuid::Uuid;

use crate::parser::ParsedSchedule;

/// Dispatch outcome of a service call.
///
/// Serialized as the bare integer code (1..=5) so stored blobs and exported
/// files stay compatible with the dashboard's existing JSON shape.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ScheduleStatus {
    /// 입고
    Received = 1,
    /// 방문취소
    VisitCancelled = 2,
    /// 현장취소
    SiteCancelled = 3,
    /// 현장완료
    SiteCompleted = 4,
    /// 수리취소
    RepairCancelled = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown schedule status code: {0}")]
pub struct InvalidStatusCode(pub u8);

impl ScheduleStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Display label used in the table selector and the statistics panel.
    pub fn label(self) -> &'static str {
        match self {
            ScheduleStatus::Received => "입고",
            ScheduleStatus::VisitCancelled => "방문취소",
            ScheduleStatus::SiteCancelled => "현장취소",
            ScheduleStatus::SiteCompleted => "현장완료",
            ScheduleStatus::RepairCancelled => "수리취소",
        }
    }

    /// Chart slice colour.
    pub fn color(self) -> &'static str {
        match self {
            ScheduleStatus::Received => "#1890ff",
            ScheduleStatus::VisitCancelled => "#f759ab",
            ScheduleStatus::SiteCancelled => "#faad14",
            ScheduleStatus::SiteCompleted => "#52c41a",
            ScheduleStatus::RepairCancelled => "#bfbfbf",
        }
    }

    /// All known statuses in code order.
    pub fn all() -> impl Iterator<Item = ScheduleStatus> {
        ScheduleStatus::iter()
    }
}

impl Default for ScheduleStatus {
    fn default() -> Self {
        ScheduleStatus::Received
    }
}

impl TryFrom<u8> for ScheduleStatus {
    type Error = InvalidStatusCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ScheduleStatus::Received),
            2 => Ok(ScheduleStatus::VisitCancelled),
            3 => Ok(ScheduleStatus::SiteCancelled),
            4 => Ok(ScheduleStatus::SiteCompleted),
            5 => Ok(ScheduleStatus::RepairCancelled),
            other => Err(InvalidStatusCode(other)),
        }
    }
}

impl From<ScheduleStatus> for u8 {
    fn from(status: ScheduleStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One parsed service-call entry.
///
/// Field names follow the JSON payload exchanged with `/api/schedules`
/// (`phoneNumber`, `customerCode`, ...). Records written before ids existed
/// are assigned a fresh id when they are read; the server stores those ids
/// on first read (see [`crate::remote_store::RemoteStore::fetch`]), while a
/// local cache or import file keeps them only once it is written again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub phone_number: String,
    pub customer_code: String,
    #[serde(default)]
    pub address: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: ScheduleStatus,
}

impl ScheduleRecord {
    /// Builds a freshly received record from parser output.
    pub fn new(parsed: ParsedSchedule, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone_number: parsed.phone_number,
            customer_code: parsed.customer_code,
            address: parsed.address,
            date,
            status: ScheduleStatus::Received,
        }
    }
}
