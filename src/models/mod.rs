pub mod schedule;

pub use schedule::{InvalidStatusCode, ScheduleRecord, ScheduleStatus};
