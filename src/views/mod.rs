//! Presentation-independent views derived from the schedule collection.

pub mod render;
pub mod stats;

pub use render::{render_rows, render_table, ScheduleRow, EMPTY_MESSAGE};
pub use stats::{compute_stats, StatsView, StatusChart, StatusShare, StatusStats};
